//! Product catalog routes: public browsing plus admin CRUD, batch import,
//! and image upload.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use foxglove_core::{Price, ProductKind};

use crate::db::{ProductRepository, products::ProductFilter};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{ExtendedDetails, ProductDoc, ProductView};
use crate::services::dedupe::{self, ImportCandidate};
use crate::state::AppState;

/// Query parameters for the public listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub kind: Option<String>,
    pub subcategory: Option<String>,
    pub collection: Option<String>,
    pub occasion: Option<String>,
    pub featured: Option<bool>,
    pub group: Option<String>,
}

/// Body for create and update. Updates treat every field as optional.
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub kind: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub collection_name: Option<String>,
    pub occasion: Option<String>,
    pub featured: Option<bool>,
    pub product_group: Option<String>,
    pub extended_details: Option<ExtendedDetails>,
}

/// Outcome of a batch import row.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub created: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// GET /api/products
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let filter = ProductFilter {
        kind: match query.kind.as_deref() {
            Some(kind) => Some(parse_kind(kind)?),
            None => None,
        },
        subcategory: query.subcategory,
        collection_name: query.collection,
        occasion: query.occasion,
        featured: query.featured,
        product_group: query.group,
    };
    let products = ProductRepository::new(state.db()).list(&filter).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// GET /api/products/:id
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id = parse_object_id(&id)?;
    let product = ProductRepository::new(state.db())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;
    Ok(Json(product.into()))
}

/// POST /api/products
#[instrument(skip(state, input), fields(name))]
pub async fn create_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductView>)> {
    let mut doc = build_product_doc(input)?;
    let repo = ProductRepository::new(state.db());
    let id = repo.create(&doc).await?;
    doc.id = Some(id);
    info!(product = %doc.name, "product created");
    Ok((StatusCode::CREATED, Json(doc.into())))
}

/// PUT /api/products/:id
#[instrument(skip(state, input))]
pub async fn update_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ProductView>> {
    let id = parse_object_id(&id)?;
    let set = build_update_document(&input)?;
    let repo = ProductRepository::new(state.db());
    if !repo.update(id, set).await? {
        return Err(AppError::NotFound("product not found".to_string()));
    }
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;
    Ok(Json(product.into()))
}

/// DELETE /api/products/:id
#[instrument(skip(state))]
pub async fn delete_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_object_id(&id)?;
    if !ProductRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("product not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/batch
///
/// Imports a list of products, skipping rows that look like duplicates of
/// existing catalog entries.
#[instrument(skip(state, inputs), fields(count = inputs.len()))]
pub async fn batch_import(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(inputs): Json<Vec<ProductInput>>,
) -> Result<Json<BatchResponse>> {
    let repo = ProductRepository::new(state.db());
    let mut catalog = repo.list(&ProductFilter::default()).await?;

    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for input in inputs {
        let doc = match build_product_doc(input) {
            Ok(doc) => doc,
            Err(e) => {
                skipped.push(SkippedEntry {
                    name: "(invalid row)".to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let candidate = ImportCandidate {
            name: &doc.name,
            description: &doc.description,
        };
        if let Some(existing) = dedupe::find_duplicate(&candidate, &catalog) {
            skipped.push(SkippedEntry {
                name: doc.name.clone(),
                reason: format!("looks like a duplicate of \"{}\"", existing.name),
            });
            continue;
        }

        let mut doc = doc;
        let id = repo.create(&doc).await?;
        doc.id = Some(id);
        created.push(doc.name.clone());
        // Later rows dedupe against earlier rows of the same import.
        catalog.push(doc);
    }

    info!(
        created = created.len(),
        skipped = skipped.len(),
        "batch import finished"
    );
    Ok(Json(BatchResponse { created, skipped }))
}

/// Body for the merge/unmerge endpoint. A `group` label merges the
/// products; omitting it clears their grouping.
#[derive(Debug, Deserialize)]
pub struct GroupInput {
    pub ids: Vec<String>,
    #[serde(default)]
    pub group: Option<String>,
}

/// PUT /api/products/group
///
/// Sets or clears the display-group label on a set of products. Only the
/// `product_group` field is touched.
#[instrument(skip(state, input), fields(count = input.ids.len(), group = input.group.as_deref()))]
pub async fn set_product_group(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<GroupInput>,
) -> Result<Json<serde_json::Value>> {
    if input.ids.is_empty() {
        return Err(AppError::BadRequest("ids cannot be empty".to_string()));
    }
    let ids = input
        .ids
        .iter()
        .map(|id| parse_object_id(id))
        .collect::<Result<Vec<_>>>()?;

    let repo = ProductRepository::new(state.db());
    let modified = match input.group.as_deref().map(str::trim) {
        Some(group) if !group.is_empty() => repo.set_group(&ids, group).await?,
        _ => repo.clear_group(&ids).await?,
    };

    info!(modified, "product grouping updated");
    Ok(Json(serde_json::json!({ "modified": modified })))
}

/// POST /api/products/:id/images
///
/// Accepts multipart form uploads, writes each file to the uploads dir
/// with a UUID-prefixed name, and records the URLs on the product.
#[instrument(skip(state, multipart))]
pub async fn upload_images(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Vec<String>>> {
    let id = parse_object_id(&id)?;
    let repo = ProductRepository::new(state.db());
    if repo.get(id).await?.is_none() {
        return Err(AppError::NotFound("product not found".to_string()));
    }

    let uploads_dir = std::path::Path::new(&state.config().uploads_dir);
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| AppError::Internal(format!("uploads dir: {e}")))?;

    let mut urls = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let original = field.file_name().unwrap_or("upload").to_string();
        let filename = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&original));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?;
        if bytes.is_empty() {
            continue;
        }
        tokio::fs::write(uploads_dir.join(&filename), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("write upload: {e}")))?;
        urls.push(format!("/admin/uploads/{filename}"));
    }

    if urls.is_empty() {
        return Err(AppError::BadRequest("no files uploaded".to_string()));
    }

    repo.add_images(id, &urls).await?;
    info!(count = urls.len(), "images uploaded");
    Ok(Json(urls))
}

/// Validate a create body and fill defaults.
fn build_product_doc(input: ProductInput) -> Result<ProductDoc> {
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?
        .to_string();
    let price = input
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    let price = Price::parse(price).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let kind = input
        .kind
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("kind is required".to_string()))?;
    let kind = parse_kind(kind)?;
    let stock = input.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }

    let now = chrono::Utc::now();
    Ok(ProductDoc {
        id: None,
        name,
        description: input.description.unwrap_or_default().trim().to_string(),
        price: price.amount(),
        image: input.image,
        images: input.images.unwrap_or_default(),
        stock,
        kind,
        subcategory: input.subcategory,
        options: input.options.unwrap_or_default(),
        collection_name: input.collection_name,
        occasion: input.occasion,
        featured: input.featured.unwrap_or(false),
        product_group: input.product_group,
        extended_details: input.extended_details,
        created_at: now,
        updated_at: now,
    })
}

/// Validate an update body and build the `$set` document from the fields
/// that are present.
fn build_update_document(input: &ProductInput) -> Result<mongodb::bson::Document> {
    use mongodb::bson::doc;

    let mut set = doc! {};
    if let Some(name) = &input.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }
        set.insert("name", name);
    }
    if let Some(description) = &input.description {
        set.insert("description", description.trim());
    }
    if let Some(price) = input.price {
        let price = Price::parse(price).map_err(|e| AppError::BadRequest(e.to_string()))?;
        set.insert("price", price.amount());
    }
    if let Some(kind) = &input.kind {
        set.insert("kind", parse_kind(kind)?.as_str());
    }
    if let Some(stock) = input.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("stock cannot be negative".to_string()));
        }
        set.insert("stock", stock);
    }
    if let Some(image) = &input.image {
        set.insert("image", image.as_str());
    }
    if let Some(images) = &input.images {
        set.insert("images", images.clone());
    }
    if let Some(subcategory) = &input.subcategory {
        set.insert("subcategory", subcategory.as_str());
    }
    if let Some(options) = &input.options {
        set.insert("options", options.clone());
    }
    if let Some(collection_name) = &input.collection_name {
        set.insert("collection_name", collection_name.as_str());
    }
    if let Some(occasion) = &input.occasion {
        set.insert("occasion", occasion.as_str());
    }
    if let Some(featured) = input.featured {
        set.insert("featured", featured);
    }
    if let Some(group) = &input.product_group {
        set.insert("product_group", group.as_str());
    }
    if let Some(details) = &input.extended_details {
        let value = mongodb::bson::to_bson(details)
            .map_err(|e| AppError::BadRequest(format!("invalid extended details: {e}")))?;
        set.insert("extended_details", value);
    }
    if set.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }
    Ok(set)
}

fn parse_kind(kind: &str) -> Result<ProductKind> {
    ProductKind::from_str_opt(kind)
        .ok_or_else(|| AppError::BadRequest(format!("kind must be decor or food, got '{kind}'")))
}

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest(format!("invalid id: {id}")))
}

/// Keep only characters safe to put in a filename.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_input() -> ProductInput {
        ProductInput {
            name: Some("Cedar Garland".to_string()),
            description: Some("Six feet of fresh cedar".to_string()),
            price: Some(24.0),
            kind: Some("decor".to_string()),
            stock: Some(10),
            image: None,
            images: None,
            subcategory: None,
            options: None,
            collection_name: None,
            occasion: None,
            featured: None,
            product_group: None,
            extended_details: None,
        }
    }

    #[test]
    fn test_build_product_doc_fills_defaults() {
        let doc = build_product_doc(minimal_input()).expect("valid");
        assert_eq!(doc.name, "Cedar Garland");
        assert!(!doc.featured);
        assert!(doc.images.is_empty());
    }

    #[test]
    fn test_build_product_doc_rejects_negative_price() {
        let mut input = minimal_input();
        input.price = Some(-1.0);
        assert!(build_product_doc(input).is_err());
    }

    #[test]
    fn test_build_product_doc_rejects_non_finite_price() {
        let mut input = minimal_input();
        input.price = Some(f64::NAN);
        assert!(build_product_doc(input).is_err());
    }

    #[test]
    fn test_build_product_doc_rejects_unknown_kind() {
        let mut input = minimal_input();
        input.kind = Some("furniture".to_string());
        assert!(build_product_doc(input).is_err());
    }

    #[test]
    fn test_build_product_doc_requires_name() {
        let mut input = minimal_input();
        input.name = Some("   ".to_string());
        assert!(build_product_doc(input).is_err());
    }

    #[test]
    fn test_build_update_document_partial() {
        let mut input = minimal_input();
        input.name = None;
        input.kind = None;
        input.price = Some(30.0);
        input.stock = None;
        input.description = None;
        let set = build_update_document(&input).expect("valid");
        assert!(set.contains_key("price"));
        assert!(!set.contains_key("name"));
    }

    #[test]
    fn test_build_update_document_rejects_empty() {
        let input = ProductInput {
            name: None,
            description: None,
            price: None,
            kind: None,
            stock: None,
            image: None,
            images: None,
            subcategory: None,
            options: None,
            collection_name: None,
            occasion: None,
            featured: None,
            product_group: None,
            extended_details: None,
        };
        assert!(build_update_document(&input).is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo 1.png"), "photo_1.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        assert!(parse_object_id("not-an-id").is_err());
    }
}
