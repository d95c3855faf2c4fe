//! Foxglove Core - Shared domain types.
//!
//! This crate provides common types used by the Foxglove API server:
//! validated emails, prices, ratings, and status enums.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
