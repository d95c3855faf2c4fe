//! Review repository.

use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use super::RepositoryError;
use crate::models::ReviewDoc;

/// Repository for the `reviews` collection.
pub struct ReviewRepository {
    collection: Collection<ReviewDoc>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("reviews"),
        }
    }

    /// List reviews for a product, newest first.
    pub async fn list_for_product(
        &self,
        product_id: ObjectId,
    ) -> Result<Vec<ReviewDoc>, RepositoryError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "product_id": product_id }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Insert a review, enforcing one per (product, user).
    ///
    /// The check-then-insert race is closed by the unique compound index
    /// created in [`super::ensure_indexes`]; a duplicate-key error from the
    /// driver is mapped to [`RepositoryError::Conflict`] as well.
    pub async fn create(&self, review: &ReviewDoc) -> Result<ObjectId, RepositoryError> {
        let existing = self
            .collection
            .find_one(
                doc! { "product_id": review.product_id, "user_id": &review.user_id },
                None,
            )
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::Conflict(
                "you have already reviewed this product".into(),
            ));
        }

        let result = self
            .collection
            .insert_one(review, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    RepositoryError::Conflict("you have already reviewed this product".into())
                } else {
                    RepositoryError::Database(e)
                }
            })?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::InvalidId("inserted_id was not an ObjectId".into()))
    }

    /// Delete a review (admin moderation). Returns false when it does not
    /// exist.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Mongo duplicate-key write errors carry code 11000.
fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}
