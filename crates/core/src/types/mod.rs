//! Core types for Foxglove.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod price;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use price::{Price, PriceError};
pub use rating::{Rating, RatingError};
pub use status::*;
