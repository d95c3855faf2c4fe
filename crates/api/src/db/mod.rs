//! MongoDB access layer.
//!
//! # Collections
//!
//! - `products` - catalog (decor + cottage food)
//! - `orders` - created after successful Square capture
//! - `messages` - contact-form inbox
//! - `reviews` - one per (product, user)
//! - `settings` - schema-less key/value store (theme, presets, background)
//!
//! Repositories borrow the shared [`mongodb::Database`] handle and expose
//! typed operations; route handlers never touch raw collections.

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub mod messages;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod settings;

pub use messages::MessageRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use settings::SettingsRepository;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Driver-level failure.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A document id that is not a valid `ObjectId` hex string.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Uniqueness violation (e.g. second review for the same product).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Connect to MongoDB and return a database handle.
///
/// The connection is verified with a `ping` so startup fails fast when the
/// URI is wrong.
///
/// # Errors
///
/// Returns `mongodb::error::Error` if the URI is invalid or the server is
/// unreachable.
pub async fn connect(
    uri: &SecretString,
    database: &str,
) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(uri.expose_secret()).await?;
    options.app_name = Some("foxglove-api".to_string());

    let client = Client::with_options(options)?;
    let db = client.database(database);

    db.run_command(doc! { "ping": 1 }, None).await?;
    Ok(db)
}

/// Create the indexes the application relies on.
///
/// Idempotent; safe to run on every startup.
///
/// # Errors
///
/// Returns `mongodb::error::Error` if index creation fails.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // One review per (product, user).
    let unique_review = IndexModel::builder()
        .keys(doc! { "product_id": 1, "user_id": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    db.collection::<crate::models::ReviewDoc>("reviews")
        .create_index(unique_review, None)
        .await?;

    // Settings are looked up by key.
    let setting_key = IndexModel::builder()
        .keys(doc! { "key": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    db.collection::<crate::models::SettingDoc>("settings")
        .create_index(setting_key, None)
        .await?;

    // Shop listing filters.
    let product_kind = IndexModel::builder()
        .keys(doc! { "kind": 1, "subcategory": 1 })
        .build();
    db.collection::<crate::models::ProductDoc>("products")
        .create_index(product_kind, None)
        .await?;

    Ok(())
}

/// Escape a user-supplied string for use inside a `$regex` filter.
///
/// Mongo regexes are PCRE-flavored; everything outside `[A-Za-z0-9 ]` that
/// carries meaning gets a backslash.
#[must_use]
pub fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_regex_passthrough() {
        assert_eq!(escape_regex("Christmas Wreath"), "Christmas Wreath");
    }

    #[test]
    fn test_escape_regex_metacharacters() {
        assert_eq!(escape_regex("jam (plum)"), "jam \\(plum\\)");
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("1+1=2?"), "1\\+1=2\\?");
    }
}
