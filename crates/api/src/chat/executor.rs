//! Executes parsed admin actions against the catalog.

use chrono::Utc;
use mongodb::Database;
use tracing::{instrument, warn};

use foxglove_core::{Price, ProductKind};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::ProductDoc;

use super::actions::AdminAction;

/// Executes [`AdminAction`]s. Every branch resolves products by name,
/// validates values, and performs one repository call; the summary string
/// it returns is appended to the chat reply.
pub struct ActionExecutor {
    products: ProductRepository,
}

impl ActionExecutor {
    /// Create a new executor.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Execute an action and return a summary for the chat reply.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message (already scrubbed of internals) when
    /// the action cannot be applied.
    #[instrument(skip(self, action), fields(action = action_name(&action)))]
    pub async fn execute(&self, action: AdminAction) -> Result<String, String> {
        match action {
            AdminAction::Create {
                name,
                description,
                price,
                kind,
                stock,
                subcategory,
                occasion,
            } => {
                self.create(name, description, price, &kind, stock, subcategory, occasion)
                    .await
            }
            AdminAction::Update { name, patch } => {
                let set = patch.to_set_document()?;
                let product = self.find_required(&name).await?;
                self.products
                    .update(product_id(&product)?, set)
                    .await
                    .map_err(scrub)?;
                Ok(format!("Updated \"{}\".", product.name))
            }
            AdminAction::Delete { name } => {
                let product = self.find_required(&name).await?;
                self.products
                    .delete(product_id(&product)?)
                    .await
                    .map_err(scrub)?;
                Ok(format!("Deleted \"{}\".", product.name))
            }
            AdminAction::Stats => self.stats().await,
            AdminAction::LowStock { threshold } => {
                let products = self.products.low_stock(threshold).await.map_err(scrub)?;
                Ok(summarize_list(
                    &format!("{} product(s) at or below {threshold} in stock", products.len()),
                    &products,
                ))
            }
            AdminAction::OutOfStock => {
                let products = self.products.out_of_stock().await.map_err(scrub)?;
                Ok(summarize_list(
                    &format!("{} product(s) out of stock", products.len()),
                    &products,
                ))
            }
            AdminAction::ListProducts { kind } => self.list_products(kind.as_deref()).await,
            AdminAction::AddPhotos { name, urls } => {
                let product = self.find_required(&name).await?;
                self.products
                    .add_images(product_id(&product)?, &urls)
                    .await
                    .map_err(scrub)?;
                Ok(format!(
                    "Added {} photo(s) to \"{}\".",
                    urls.len(),
                    product.name
                ))
            }
            AdminAction::RemovePhotos { name, urls } => {
                let product = self.find_required(&name).await?;
                self.products
                    .remove_images(product_id(&product)?, &urls)
                    .await
                    .map_err(scrub)?;
                Ok(format!(
                    "Removed {} photo(s) from \"{}\".",
                    urls.len(),
                    product.name
                ))
            }
            AdminAction::MergeProducts { names, group } => self.merge(&names, &group).await,
            AdminAction::AddToGroup { name, group } => {
                let product = self.find_required(&name).await?;
                self.products
                    .set_group(&[product_id(&product)?], &group)
                    .await
                    .map_err(scrub)?;
                Ok(format!("Added \"{}\" to group \"{group}\".", product.name))
            }
            AdminAction::BulkUpdate { filter, set } => {
                let filter = filter.to_document()?;
                let set = set.to_set_document()?;
                let modified = self.products.bulk_update(filter, set).await.map_err(scrub)?;
                Ok(format!("Updated {modified} product(s)."))
            }
            AdminAction::BulkDelete { filter } => {
                let filter = filter.to_document()?;
                let deleted = self.products.bulk_delete(filter).await.map_err(scrub)?;
                Ok(format!("Deleted {deleted} product(s)."))
            }
            AdminAction::Search { query } => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    return Err("search needs a query".to_string());
                }
                let products = self.products.search(&query).await.map_err(scrub)?;
                Ok(summarize_list(
                    &format!("{} match(es) for \"{query}\"", products.len()),
                    &products,
                ))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn create(
        &self,
        name: String,
        description: String,
        price: f64,
        kind: &str,
        stock: i64,
        subcategory: Option<String>,
        occasion: Option<String>,
    ) -> Result<String, String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err("product name cannot be empty".to_string());
        }
        let price = Price::parse(price).map_err(|e| e.to_string())?;
        let kind = ProductKind::from_str_opt(kind)
            .ok_or_else(|| format!("unknown product kind '{kind}' (decor or food)"))?;
        if stock < 0 {
            return Err("stock cannot be negative".to_string());
        }
        if self.products.find_by_name(&name).await.map_err(scrub)?.is_some() {
            return Err(format!("a product named \"{name}\" already exists"));
        }

        let now = Utc::now();
        let doc = ProductDoc {
            id: None,
            name: name.clone(),
            description: description.trim().to_string(),
            price: price.amount(),
            image: None,
            images: vec![],
            stock,
            kind,
            subcategory,
            options: vec![],
            collection_name: None,
            occasion,
            featured: false,
            product_group: None,
            extended_details: None,
            created_at: now,
            updated_at: now,
        };
        self.products.create(&doc).await.map_err(scrub)?;
        Ok(format!(
            "Created \"{name}\" at {} with {stock} in stock.",
            price.display()
        ))
    }

    async fn stats(&self) -> Result<String, String> {
        let products = self
            .products
            .list(&crate::db::products::ProductFilter::default())
            .await
            .map_err(scrub)?;
        let total = products.len();
        let total_stock: i64 = products.iter().map(|p| p.stock).sum();
        let out_of_stock = products.iter().filter(|p| p.stock == 0).count();
        #[allow(clippy::cast_precision_loss)]
        let inventory_value: f64 = products.iter().map(|p| p.price * p.stock as f64).sum();
        Ok(format!(
            "{total} products, {total_stock} items in stock, {out_of_stock} out of stock, inventory value ${inventory_value:.2}."
        ))
    }

    async fn list_products(&self, kind: Option<&str>) -> Result<String, String> {
        let mut filter = crate::db::products::ProductFilter::default();
        if let Some(kind) = kind {
            filter.kind = Some(
                ProductKind::from_str_opt(kind)
                    .ok_or_else(|| format!("unknown product kind '{kind}' (decor or food)"))?,
            );
        }
        let products = self.products.list(&filter).await.map_err(scrub)?;
        Ok(summarize_list(
            &format!("{} product(s)", products.len()),
            &products,
        ))
    }

    async fn merge(&self, names: &[String], group: &str) -> Result<String, String> {
        let group = group.trim();
        if group.is_empty() {
            return Err("group label cannot be empty".to_string());
        }
        if names.len() < 2 {
            return Err("merging needs at least two product names".to_string());
        }

        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let product = self.find_required(name).await?;
            ids.push(product_id(&product)?);
        }
        let modified = self.products.set_group(&ids, group).await.map_err(scrub)?;
        Ok(format!("Merged {modified} product(s) into group \"{group}\"."))
    }

    async fn find_required(&self, name: &str) -> Result<ProductDoc, String> {
        self.products
            .find_by_name(name)
            .await
            .map_err(scrub)?
            .ok_or_else(|| format!("no product named \"{}\"", name.trim()))
    }
}

fn product_id(product: &ProductDoc) -> Result<mongodb::bson::oid::ObjectId, String> {
    product
        .id
        .ok_or_else(|| "product document has no id".to_string())
}

/// Map repository failures to a message safe for the chat reply.
fn scrub(error: RepositoryError) -> String {
    warn!(error = %error, "chat action repository error");
    "storage error, nothing was changed".to_string()
}

/// Short name lines for list-style replies.
fn summarize_list(heading: &str, products: &[ProductDoc]) -> String {
    if products.is_empty() {
        return format!("{heading}.");
    }
    let lines: Vec<String> = products
        .iter()
        .map(|p| format!("- {} (${:.2}, {} in stock)", p.name, p.price, p.stock))
        .collect();
    format!("{heading}:\n{}", lines.join("\n"))
}

/// Stable name for tracing spans.
const fn action_name(action: &AdminAction) -> &'static str {
    match action {
        AdminAction::Create { .. } => "create",
        AdminAction::Update { .. } => "update",
        AdminAction::Delete { .. } => "delete",
        AdminAction::Stats => "stats",
        AdminAction::LowStock { .. } => "low_stock",
        AdminAction::OutOfStock => "out_of_stock",
        AdminAction::ListProducts { .. } => "list_products",
        AdminAction::AddPhotos { .. } => "add_photos",
        AdminAction::RemovePhotos { .. } => "remove_photos",
        AdminAction::MergeProducts { .. } => "merge_products",
        AdminAction::AddToGroup { .. } => "add_to_group",
        AdminAction::BulkUpdate { .. } => "bulk_update",
        AdminAction::BulkDelete { .. } => "bulk_delete",
        AdminAction::Search { .. } => "search",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, price: f64, stock: i64) -> ProductDoc {
        ProductDoc {
            id: Some(mongodb::bson::oid::ObjectId::new()),
            name: name.to_string(),
            description: String::new(),
            price,
            image: None,
            images: vec![],
            stock,
            kind: ProductKind::Decor,
            subcategory: None,
            options: vec![],
            collection_name: None,
            occasion: None,
            featured: false,
            product_group: None,
            extended_details: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_list_empty() {
        assert_eq!(summarize_list("0 product(s)", &[]), "0 product(s).");
    }

    #[test]
    fn test_summarize_list_lines() {
        let products = vec![product("Wreath", 42.0, 3), product("Jam", 8.5, 12)];
        let summary = summarize_list("2 product(s)", &products);
        assert!(summary.starts_with("2 product(s):\n"));
        assert!(summary.contains("- Wreath ($42.00, 3 in stock)"));
        assert!(summary.contains("- Jam ($8.50, 12 in stock)"));
    }

    #[test]
    fn test_action_name_covers_variants() {
        assert_eq!(action_name(&AdminAction::Stats), "stats");
        assert_eq!(
            action_name(&AdminAction::Search {
                query: "jam".to_string()
            }),
            "search"
        );
    }
}
