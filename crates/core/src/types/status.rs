//! Status and category enums shared across the API.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Top-level product category. The shop sells handmade decor pieces and
/// cottage-food items; everything else hangs off `subcategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Florals, wreaths, crafts.
    Decor,
    /// Cottage-food items (jams, baked goods).
    Food,
}

impl ProductKind {
    /// Parse from the wire string form used by the REST API and the
    /// chatbot action contract.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "decor" => Some(Self::Decor),
            "food" => Some(Self::Food),
            _ => None,
        }
    }

    /// The wire string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Decor => "decor",
            Self::Food => "food",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    /// Parse from the wire string form.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "fulfilled" => Some(Self::Fulfilled),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Payment status as reported by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Approved,
    Pending,
    Failed,
}

/// Payment method. Square card payments are the only method today; the
/// enum leaves room for pickup-with-cash later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Square,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_kind_parse() {
        assert_eq!(ProductKind::from_str_opt("decor"), Some(ProductKind::Decor));
        assert_eq!(ProductKind::from_str_opt("Food"), Some(ProductKind::Food));
        assert_eq!(ProductKind::from_str_opt(" FOOD "), Some(ProductKind::Food));
        assert_eq!(ProductKind::from_str_opt("plants"), None);
        assert_eq!(ProductKind::from_str_opt(""), None);
    }

    #[test]
    fn test_product_kind_serde() {
        let json = serde_json::to_string(&ProductKind::Decor).expect("serialize");
        assert_eq!(json, "\"decor\"");
        let kind: ProductKind = serde_json::from_str("\"food\"").expect("deserialize");
        assert_eq!(kind, ProductKind::Food);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(
            OrderStatus::from_str_opt("fulfilled"),
            Some(OrderStatus::Fulfilled)
        );
        assert_eq!(OrderStatus::from_str_opt("shipped"), None);
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
