//! The typed admin-action contract.
//!
//! The model is instructed to answer admin requests with a fenced JSON
//! block whose `action` field selects one of the variants below. serde
//! does the field whitelisting and type checking that the old JS
//! implementation hand-rolled with `parseFloat`/`parseInt` and string
//! comparisons.

use serde::Deserialize;

use foxglove_core::{Price, ProductKind};

/// A store mutation (or query) requested through the chatbot.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    /// Create a product.
    Create {
        name: String,
        #[serde(default)]
        description: String,
        price: f64,
        kind: String,
        #[serde(default)]
        stock: i64,
        #[serde(default)]
        subcategory: Option<String>,
        #[serde(default)]
        occasion: Option<String>,
    },
    /// Update one product, located by name.
    Update {
        name: String,
        #[serde(flatten)]
        patch: ProductPatch,
    },
    /// Delete one product, located by name.
    Delete { name: String },
    /// Catalog statistics (counts, stock totals, inventory value).
    Stats,
    /// Products with stock at or below a threshold.
    LowStock {
        #[serde(default = "default_low_stock_threshold")]
        threshold: i64,
    },
    /// Products with zero stock.
    OutOfStock,
    /// List the catalog, optionally one category.
    ListProducts {
        #[serde(default)]
        kind: Option<String>,
    },
    /// Append gallery photos to a product.
    AddPhotos { name: String, urls: Vec<String> },
    /// Remove gallery photos from a product.
    RemovePhotos { name: String, urls: Vec<String> },
    /// Group several products under one display label.
    MergeProducts { names: Vec<String>, group: String },
    /// Add one product to an existing display group.
    AddToGroup { name: String, group: String },
    /// Apply one patch to every product matching the filter.
    BulkUpdate {
        filter: BulkFilter,
        set: ProductPatch,
    },
    /// Delete every product matching the filter.
    BulkDelete { filter: BulkFilter },
    /// Substring search over names and descriptions.
    Search { query: String },
}

const fn default_low_stock_threshold() -> i64 {
    5
}

/// The fields the chatbot is allowed to change on a product. Anything the
/// model invents outside this set is silently dropped by serde.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProductPatch {
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ProductPatch {
    /// Validate the patch and build a `$set` document from it.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message (destined for the chat reply) when
    /// a value violates an invariant or the patch is empty.
    pub fn to_set_document(&self) -> Result<mongodb::bson::Document, String> {
        use mongodb::bson::doc;

        let mut set = doc! {};

        if let Some(name) = &self.new_name {
            let name = name.trim();
            if name.is_empty() {
                return Err("product name cannot be empty".to_string());
            }
            set.insert("name", name);
        }
        if let Some(description) = &self.description {
            set.insert("description", description.trim());
        }
        if let Some(price) = self.price {
            let price = Price::parse(price).map_err(|e| e.to_string())?;
            set.insert("price", price.amount());
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err("stock cannot be negative".to_string());
            }
            set.insert("stock", stock);
        }
        if let Some(kind) = &self.kind {
            let kind = ProductKind::from_str_opt(kind)
                .ok_or_else(|| format!("unknown product kind '{kind}' (decor or food)"))?;
            set.insert("kind", kind.as_str());
        }
        if let Some(subcategory) = &self.subcategory {
            set.insert("subcategory", subcategory.trim());
        }
        if let Some(occasion) = &self.occasion {
            set.insert("occasion", occasion.trim());
        }
        if let Some(collection_name) = &self.collection_name {
            set.insert("collection_name", collection_name.trim());
        }
        if let Some(featured) = self.featured {
            set.insert("featured", featured);
        }

        if set.is_empty() {
            return Err("nothing to update".to_string());
        }
        Ok(set)
    }
}

/// Scope of a bulk operation. Deliberately narrow: a bulk write must name
/// a category, subcategory, occasion, or collection — the contract refuses
/// a filter that would sweep the whole catalog.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BulkFilter {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
}

impl BulkFilter {
    /// Validate the filter and build a Mongo filter document.
    ///
    /// # Errors
    ///
    /// Returns a message when the filter is empty or names an unknown
    /// product kind.
    pub fn to_document(&self) -> Result<mongodb::bson::Document, String> {
        use mongodb::bson::doc;

        let mut filter = doc! {};
        if let Some(kind) = &self.kind {
            let kind = ProductKind::from_str_opt(kind)
                .ok_or_else(|| format!("unknown product kind '{kind}' (decor or food)"))?;
            filter.insert("kind", kind.as_str());
        }
        if let Some(subcategory) = &self.subcategory {
            filter.insert("subcategory", subcategory.trim());
        }
        if let Some(occasion) = &self.occasion {
            filter.insert("occasion", occasion.trim());
        }
        if let Some(collection_name) = &self.collection_name {
            filter.insert("collection_name", collection_name.trim());
        }

        if filter.is_empty() {
            return Err(
                "bulk operations need a filter (kind, subcategory, occasion, or collection)"
                    .to_string(),
            );
        }
        Ok(filter)
    }
}

/// Extract the first fenced ```json block from a reply.
fn extract_fenced_json(reply: &str) -> Option<&str> {
    let start = reply.find("```json")?;
    let body = &reply[start + "```json".len()..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Parse an admin action out of a model reply.
///
/// Returns `None` when the reply has no fenced JSON block or the block is
/// not valid JSON for the action contract — in both cases the reply passes
/// through as plain conversation.
#[must_use]
pub fn parse_admin_action(reply: &str) -> Option<AdminAction> {
    let block = extract_fenced_json(reply)?;
    serde_json::from_str(block).ok()
}

/// Remove the fenced action block from a reply so users see prose only.
#[must_use]
pub fn strip_action_block(reply: &str) -> String {
    let Some(start) = reply.find("```json") else {
        return reply.trim().to_string();
    };
    let after = &reply[start + "```json".len()..];
    match after.find("```") {
        Some(end) => {
            let mut out = reply[..start].trim_end().to_string();
            let tail = after[end + 3..].trim_start();
            if !tail.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(tail);
            }
            out.trim().to_string()
        }
        None => reply.trim().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_fenced_block_is_none() {
        assert_eq!(parse_admin_action("Sure, here are your products."), None);
        assert_eq!(parse_admin_action(""), None);
    }

    #[test]
    fn test_parse_invalid_json_is_none() {
        let reply = "Done!\n```json\n{ not json at all\n```";
        assert_eq!(parse_admin_action(reply), None);
    }

    #[test]
    fn test_parse_unknown_action_is_none() {
        let reply = "```json\n{\"action\": \"drop_database\"}\n```";
        assert_eq!(parse_admin_action(reply), None);
    }

    #[test]
    fn test_parse_wrong_type_is_none() {
        // price must be a number, not a string
        let reply =
            "```json\n{\"action\": \"create\", \"name\": \"Jam\", \"price\": \"cheap\", \"kind\": \"food\"}\n```";
        assert_eq!(parse_admin_action(reply), None);
    }

    #[test]
    fn test_parse_create() {
        let reply = concat!(
            "Creating that now.\n",
            "```json\n",
            "{\"action\": \"create\", \"name\": \"Plum Jam\", \"price\": 8.5, ",
            "\"kind\": \"food\", \"stock\": 12}\n",
            "```"
        );
        let action = parse_admin_action(reply).unwrap();
        match action {
            AdminAction::Create {
                name, price, stock, ..
            } => {
                assert_eq!(name, "Plum Jam");
                assert!((price - 8.5).abs() < f64::EPSILON);
                assert_eq!(stock, 12);
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_update_with_flattened_patch() {
        let reply = "```json\n{\"action\": \"update\", \"name\": \"Plum Jam\", \"price\": 9.0, \"featured\": true}\n```";
        let action = parse_admin_action(reply).unwrap();
        match action {
            AdminAction::Update { name, patch } => {
                assert_eq!(name, "Plum Jam");
                assert_eq!(patch.price, Some(9.0));
                assert_eq!(patch.featured, Some(true));
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_low_stock_default_threshold() {
        let action = parse_admin_action("```json\n{\"action\": \"low_stock\"}\n```").unwrap();
        assert_eq!(action, AdminAction::LowStock { threshold: 5 });
    }

    #[test]
    fn test_parse_merge_products() {
        let reply = "```json\n{\"action\": \"merge_products\", \"names\": [\"Wreath S\", \"Wreath L\"], \"group\": \"Wreaths\"}\n```";
        let action = parse_admin_action(reply).unwrap();
        assert_eq!(
            action,
            AdminAction::MergeProducts {
                names: vec!["Wreath S".to_string(), "Wreath L".to_string()],
                group: "Wreaths".to_string(),
            }
        );
    }

    #[test]
    fn test_patch_rejects_negative_price() {
        let patch = ProductPatch {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(patch.to_set_document().is_err());
    }

    #[test]
    fn test_patch_rejects_unknown_kind() {
        let patch = ProductPatch {
            kind: Some("plants".to_string()),
            ..Default::default()
        };
        assert!(patch.to_set_document().is_err());
    }

    #[test]
    fn test_patch_rejects_empty() {
        assert!(ProductPatch::default().to_set_document().is_err());
    }

    #[test]
    fn test_patch_builds_set_document() {
        let patch = ProductPatch {
            price: Some(12.0),
            stock: Some(3),
            kind: Some("Decor".to_string()),
            ..Default::default()
        };
        let set = patch.to_set_document().unwrap();
        assert!((set.get_f64("price").unwrap() - 12.0).abs() < f64::EPSILON);
        assert_eq!(set.get_i64("stock").unwrap(), 3);
        assert_eq!(set.get_str("kind").unwrap(), "decor");
    }

    #[test]
    fn test_bulk_filter_refuses_empty() {
        assert!(BulkFilter::default().to_document().is_err());
    }

    #[test]
    fn test_bulk_filter_builds_document() {
        let filter = BulkFilter {
            kind: Some("food".to_string()),
            occasion: Some("christmas".to_string()),
            ..Default::default()
        };
        let document = filter.to_document().unwrap();
        assert_eq!(document.get_str("kind").unwrap(), "food");
        assert_eq!(document.get_str("occasion").unwrap(), "christmas");
    }

    #[test]
    fn test_strip_action_block() {
        let reply = "I'll create that.\n```json\n{\"action\": \"stats\"}\n```\nAnything else?";
        assert_eq!(
            strip_action_block(reply),
            "I'll create that.\nAnything else?"
        );
    }

    #[test]
    fn test_strip_action_block_no_block() {
        assert_eq!(strip_action_block("  just words  "), "just words");
    }
}
