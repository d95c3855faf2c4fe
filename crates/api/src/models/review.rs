//! Product review documents.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// A review in the `reviews` collection. One per (product, user), enforced
/// both in the repository and by a unique compound index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub product_id: ObjectId,
    /// Firebase UID of the author.
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// JSON view of a review. The author's email is not exposed publicly.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: String,
    pub product_id: String,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewDoc> for ReviewView {
    fn from(doc: ReviewDoc) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            product_id: doc.product_id.to_hex(),
            user_name: doc.user_name,
            rating: doc.rating,
            comment: doc.comment,
            created_at: doc.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_hides_email() {
        let doc = ReviewDoc {
            id: Some(ObjectId::new()),
            product_id: ObjectId::new(),
            user_id: "uid-1".to_string(),
            user_name: "Jo".to_string(),
            user_email: "jo@example.com".to_string(),
            rating: 5,
            comment: "Beautiful wreath".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ReviewView::from(doc)).unwrap();
        assert!(json.get("user_email").is_none());
        assert_eq!(json["rating"], 5);
    }
}
