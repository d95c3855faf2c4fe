//! Product repository.

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use foxglove_core::ProductKind;

use super::{escape_regex, RepositoryError};
use crate::models::ProductDoc;

/// Listing filters accepted by `GET /api/products` and the chatbot's
/// `list_products` action.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub kind: Option<ProductKind>,
    pub subcategory: Option<String>,
    pub collection_name: Option<String>,
    pub occasion: Option<String>,
    pub featured: Option<bool>,
    pub product_group: Option<String>,
}

impl ProductFilter {
    /// Build the Mongo filter document. Empty filter lists everything.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(kind) = self.kind {
            filter.insert("kind", kind.as_str());
        }
        if let Some(subcategory) = &self.subcategory {
            filter.insert("subcategory", subcategory);
        }
        if let Some(collection_name) = &self.collection_name {
            filter.insert("collection_name", collection_name);
        }
        if let Some(occasion) = &self.occasion {
            filter.insert("occasion", occasion);
        }
        if let Some(featured) = self.featured {
            filter.insert("featured", featured);
        }
        if let Some(group) = &self.product_group {
            filter.insert("product_group", group);
        }
        filter
    }
}

/// Repository for the `products` collection.
pub struct ProductRepository {
    collection: Collection<ProductDoc>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("products"),
        }
    }

    /// List products matching the filter, newest first.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<ProductDoc>, RepositoryError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.collection.find(filter.to_document(), options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Get a product by id.
    pub async fn get(&self, id: ObjectId) -> Result<Option<ProductDoc>, RepositoryError> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    /// Find a product by exact name, case-insensitively. Used by chatbot
    /// actions that refer to products by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ProductDoc>, RepositoryError> {
        let pattern = format!("^{}$", escape_regex(name.trim()));
        Ok(self
            .collection
            .find_one(doc! { "name": { "$regex": pattern, "$options": "i" } }, None)
            .await?)
    }

    /// Insert a new product and return its generated id.
    pub async fn create(&self, product: &ProductDoc) -> Result<ObjectId, RepositoryError> {
        let result = self.collection.insert_one(product, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::InvalidId("inserted_id was not an ObjectId".into()))
    }

    /// Apply a `$set` update to one product. Returns false if no product
    /// matched. `updated_at` is always bumped.
    pub async fn update(&self, id: ObjectId, mut set: Document) -> Result<bool, RepositoryError> {
        set.insert(
            "updated_at",
            mongodb::bson::DateTime::from_chrono(Utc::now()),
        );
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Delete a product. Returns false if it did not exist.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    /// Append image URLs to a product's gallery.
    pub async fn add_images(&self, id: ObjectId, urls: &[String]) -> Result<bool, RepositoryError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$push": { "images": { "$each": urls } } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Remove image URLs from a product's gallery.
    pub async fn remove_images(
        &self,
        id: ObjectId,
        urls: &[String],
    ) -> Result<bool, RepositoryError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$pull": { "images": { "$in": urls } } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Set the display group label on a set of products (merge).
    pub async fn set_group(
        &self,
        ids: &[ObjectId],
        label: &str,
    ) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .update_many(
                doc! { "_id": { "$in": ids.to_vec() } },
                group_update_document(Some(label)),
                None,
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Clear the display group label from a set of products (unmerge).
    pub async fn clear_group(&self, ids: &[ObjectId]) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .update_many(
                doc! { "_id": { "$in": ids.to_vec() } },
                group_update_document(None),
                None,
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Apply a `$set` update across every product matching the filter.
    /// Driven by the chatbot's `bulk_update` action; the caller is
    /// responsible for having whitelisted the fields in `set`.
    pub async fn bulk_update(
        &self,
        filter: Document,
        set: Document,
    ) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .update_many(filter, doc! { "$set": set }, None)
            .await?;
        Ok(result.modified_count)
    }

    /// Delete every product matching the filter.
    pub async fn bulk_delete(&self, filter: Document) -> Result<u64, RepositoryError> {
        let result = self.collection.delete_many(filter, None).await?;
        Ok(result.deleted_count)
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search(&self, term: &str) -> Result<Vec<ProductDoc>, RepositoryError> {
        let pattern = escape_regex(term.trim());
        let cursor = self
            .collection
            .find(
                doc! { "$or": [
                    { "name": { "$regex": &pattern, "$options": "i" } },
                    { "description": { "$regex": &pattern, "$options": "i" } },
                ] },
                None,
            )
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Products with stock at or below the threshold (but not zero).
    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<ProductDoc>, RepositoryError> {
        let cursor = self
            .collection
            .find(doc! { "stock": { "$gt": 0, "$lte": threshold } }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Products with zero stock.
    pub async fn out_of_stock(&self) -> Result<Vec<ProductDoc>, RepositoryError> {
        let cursor = self.collection.find(doc! { "stock": 0 }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Atomically decrement stock after a sale. The filter refuses to go
    /// below zero; a false return means the product sold out (or vanished)
    /// between the pre-charge check and the decrement.
    pub async fn decrement_stock(
        &self,
        id: ObjectId,
        quantity: i64,
    ) -> Result<bool, RepositoryError> {
        let (filter, update) = decrement_stock_documents(id, quantity);
        let result = self.collection.update_one(filter, update, None).await?;
        Ok(result.modified_count > 0)
    }
}

/// Filter and update for a stock decrement. The `$gte` guard keeps stock
/// from going negative when two orders race for the last units.
fn decrement_stock_documents(id: ObjectId, quantity: i64) -> (Document, Document) {
    (
        doc! { "_id": id, "stock": { "$gte": quantity } },
        doc! { "$inc": { "stock": -quantity } },
    )
}

/// Update for a group merge (`Some(label)`) or unmerge (`None`). Either way
/// only the `product_group` field is touched.
fn group_update_document(label: Option<&str>) -> Document {
    match label {
        Some(label) => doc! { "$set": { "product_group": label } },
        None => doc! { "$unset": { "product_group": "" } },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_is_empty_document() {
        let filter = ProductFilter::default();
        assert!(filter.to_document().is_empty());
    }

    #[test]
    fn test_filter_document_fields() {
        let filter = ProductFilter {
            kind: Some(ProductKind::Food),
            featured: Some(true),
            product_group: Some("Wreath Trio".to_string()),
            ..Default::default()
        };
        let document = filter.to_document();
        assert_eq!(document.get_str("kind").unwrap(), "food");
        assert!(document.get_bool("featured").unwrap());
        assert_eq!(document.get_str("product_group").unwrap(), "Wreath Trio");
        assert!(document.get("subcategory").is_none());
    }

    #[test]
    fn test_decrement_stock_documents() {
        let id = ObjectId::new();
        let (filter, update) = decrement_stock_documents(id, 2);
        // selling 2 from a stock of 5 leaves 3; a stock below 2 matches nothing
        assert_eq!(
            filter.get_document("stock").unwrap().get_i64("$gte").unwrap(),
            2
        );
        assert_eq!(
            update.get_document("$inc").unwrap().get_i64("stock").unwrap(),
            -2
        );
    }

    #[test]
    fn test_group_update_touches_only_the_group_field() {
        let set = group_update_document(Some("Wreath Trio"));
        let inner = set.get_document("$set").unwrap();
        assert_eq!(inner.get_str("product_group").unwrap(), "Wreath Trio");
        assert_eq!(inner.len(), 1);

        let clear = group_update_document(None);
        let inner = clear.get_document("$unset").unwrap();
        assert!(inner.contains_key("product_group"));
        assert_eq!(inner.len(), 1);
    }
}
