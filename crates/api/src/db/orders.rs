//! Order repository.

use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use foxglove_core::OrderStatus;

use super::RepositoryError;
use crate::models::OrderDoc;

/// Repository for the `orders` collection.
pub struct OrderRepository {
    collection: Collection<OrderDoc>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("orders"),
        }
    }

    /// Persist an order created from a successful payment capture.
    pub async fn create(&self, order: &OrderDoc) -> Result<ObjectId, RepositoryError> {
        let result = self.collection.insert_one(order, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::InvalidId("inserted_id was not an ObjectId".into()))
    }

    /// List all orders, newest first.
    pub async fn list(&self) -> Result<Vec<OrderDoc>, RepositoryError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.collection.find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Get an order by id.
    pub async fn get(&self, id: ObjectId) -> Result<Option<OrderDoc>, RepositoryError> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    /// Update an order's lifecycle status. Returns false when the order
    /// does not exist.
    pub async fn update_status(
        &self,
        id: ObjectId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let status_bson =
            mongodb::bson::to_bson(&status).map_err(mongodb::error::Error::from)?;
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": status_bson } }, None)
            .await?;
        Ok(result.matched_count > 0)
    }
}
