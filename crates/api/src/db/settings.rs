//! Settings repository.

use mongodb::bson::{doc, Bson};
use mongodb::options::UpdateOptions;
use mongodb::{Collection, Database};

use super::RepositoryError;
use crate::models::SettingDoc;

/// Repository for the `settings` collection (schema-less key/value store).
pub struct SettingsRepository {
    collection: Collection<SettingDoc>,
}

impl SettingsRepository {
    /// Create a new settings repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("settings"),
        }
    }

    /// Fetch a setting by key.
    pub async fn get(&self, key: &str) -> Result<Option<SettingDoc>, RepositoryError> {
        Ok(self.collection.find_one(doc! { "key": key }, None).await?)
    }

    /// Insert or replace a setting's value.
    pub async fn upsert(&self, key: &str, value: Bson) -> Result<(), RepositoryError> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection
            .update_one(
                doc! { "key": key },
                doc! { "$set": { "value": value } },
                options,
            )
            .await?;
        Ok(())
    }
}
