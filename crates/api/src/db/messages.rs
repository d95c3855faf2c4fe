//! Contact-message repository.

use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use super::RepositoryError;
use crate::models::MessageDoc;

/// Repository for the `messages` collection.
pub struct MessageRepository {
    collection: Collection<MessageDoc>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("messages"),
        }
    }

    /// Store a contact-form submission.
    pub async fn create(&self, message: &MessageDoc) -> Result<ObjectId, RepositoryError> {
        let result = self.collection.insert_one(message, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::InvalidId("inserted_id was not an ObjectId".into()))
    }

    /// List all messages for the admin inbox, newest first.
    pub async fn list(&self) -> Result<Vec<MessageDoc>, RepositoryError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.collection.find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Flag a message as read. Returns false when it does not exist.
    pub async fn mark_read(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "read": true } }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Delete a message. Returns false when it does not exist.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
