//! Product documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use foxglove_core::ProductKind;

/// Free-form sub-document of extra product attributes. Populated manually
/// by the shop owner or by the chatbot; keys vary by product (ingredients,
/// allergens, materials, dimensions, care, ...).
pub type ExtendedDetails = BTreeMap<String, String>;

/// A product document in the `products` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Additional image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i64,
    pub kind: ProductKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Variant options offered at checkout (e.g. "small", "large").
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// Free-text label clustering related variants for merged display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_details: Option<ExtendedDetails>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// JSON view of a product, as returned by the REST API.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub images: Vec<String>,
    pub stock: i64,
    pub kind: ProductKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_details: Option<ExtendedDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDoc> for ProductView {
    fn from(doc: ProductDoc) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name,
            description: doc.description,
            price: doc.price,
            image: doc.image,
            images: doc.images,
            stock: doc.stock,
            kind: doc.kind,
            subcategory: doc.subcategory,
            options: doc.options,
            collection_name: doc.collection_name,
            occasion: doc.occasion,
            featured: doc.featured,
            product_group: doc.product_group,
            extended_details: doc.extended_details,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_doc() -> ProductDoc {
        ProductDoc {
            id: Some(ObjectId::new()),
            name: "Christmas Wreath".to_string(),
            description: "Fresh evergreen wreath with pinecones".to_string(),
            price: 42.0,
            image: Some("/admin/uploads/wreath.jpg".to_string()),
            images: vec![],
            stock: 5,
            kind: ProductKind::Decor,
            subcategory: Some("wreaths".to_string()),
            options: vec![],
            collection_name: None,
            occasion: Some("christmas".to_string()),
            featured: true,
            product_group: None,
            extended_details: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_flattens_object_id() {
        let doc = sample_doc();
        let hex = doc.id.unwrap().to_hex();
        let view = ProductView::from(doc);
        assert_eq!(view.id, hex);
        assert_eq!(view.name, "Christmas Wreath");
    }

    #[test]
    fn test_view_serializes_plain_json() {
        let view = ProductView::from(sample_doc());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["id"].is_string());
        assert_eq!(json["kind"], "decor");
        // no extended-JSON wrappers leak into the API
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn test_doc_deserializes_with_defaults() {
        // documents written before the group/featured fields existed
        let doc: ProductDoc = mongodb::bson::from_document(mongodb::bson::doc! {
            "name": "Plum Jam",
            "price": 8.5,
            "kind": "food",
            "created_at": mongodb::bson::DateTime::now(),
            "updated_at": mongodb::bson::DateTime::now(),
        })
        .unwrap();
        assert_eq!(doc.stock, 0);
        assert!(!doc.featured);
        assert!(doc.product_group.is_none());
    }
}
