//! Order documents.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use foxglove_core::{OrderStatus, PaymentMethod, PaymentStatus};

/// A purchased line item, denormalized at checkout time so the order
/// survives later product edits or deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ObjectId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Shipping address captured from the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Payment capture details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: String,
}

/// An order document in the `orders` collection. Created only after a
/// successful Square capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub customer_email: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// JSON view of an order line item.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// JSON view of an order, as returned by the admin REST API.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    pub items: Vec<OrderItemView>,
    pub total: f64,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<OrderDoc> for OrderView {
    fn from(doc: OrderDoc) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            items: doc
                .items
                .into_iter()
                .map(|item| OrderItemView {
                    product_id: item.product_id.to_hex(),
                    name: item.name,
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
            total: doc.total,
            shipping_address: doc.shipping_address,
            status: doc.status,
            payment: doc.payment,
            customer_email: doc.customer_email,
            created_at: doc.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_view_flattens_ids() {
        let product_id = ObjectId::new();
        let doc = OrderDoc {
            id: Some(ObjectId::new()),
            items: vec![OrderItem {
                product_id,
                name: "Lavender Sachet".to_string(),
                price: 6.0,
                quantity: 2,
            }],
            total: 12.0,
            shipping_address: ShippingAddress {
                name: "Jo Meadows".to_string(),
                line1: "4 Orchard Ln".to_string(),
                line2: None,
                city: "Bellbrook".to_string(),
                state: "OH".to_string(),
                postal_code: "45305".to_string(),
            },
            status: OrderStatus::Paid,
            payment: PaymentInfo {
                method: PaymentMethod::Square,
                status: PaymentStatus::Completed,
                transaction_id: "sq-txn-1".to_string(),
            },
            customer_email: "jo@example.com".to_string(),
            created_at: Utc::now(),
        };

        let view = OrderView::from(doc);
        assert_eq!(view.items[0].product_id, product_id.to_hex());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "paid");
        assert_eq!(json["payment"]["method"], "square");
    }
}
