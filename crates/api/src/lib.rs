//! Foxglove Farm & Floral API library.
//!
//! Backend for a small farm storefront: product catalog with reviews,
//! Square checkout, a contact inbox, store theming, and a Gemini-powered
//! chat assistant that doubles as a management console for the owner.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod gemini;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod square;
pub mod state;
