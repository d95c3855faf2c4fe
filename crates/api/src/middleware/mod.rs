//! Request middleware: authentication extractors and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{OptionalAdmin, RequireAdmin, RequireUser};
pub use rate_limit::{api_rate_limiter, strict_rate_limiter};
