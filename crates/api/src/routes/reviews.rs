//! Product review routes. One review per (product, user), enforced here
//! and by a unique index.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use foxglove_core::Rating;

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::{ReviewDoc, ReviewView};
use crate::routes::products::parse_object_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    pub product_id: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// GET /api/reviews?product_id=...
#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<Vec<ReviewView>>> {
    let product_id = parse_object_id(&query.product_id)?;
    let reviews = ReviewRepository::new(state.db())
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews.into_iter().map(ReviewView::from).collect()))
}

/// POST /api/reviews
///
/// Requires a signed-in user; a second review for the same product by the
/// same user is a 409.
#[instrument(skip(state, user, input), fields(uid = %user.uid))]
pub async fn create_review(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<ReviewView>)> {
    let product_id = parse_object_id(&input.product_id)?;
    let rating =
        Rating::parse(input.rating).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if ProductRepository::new(state.db())
        .get(product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("product not found".to_string()));
    }

    let mut doc = ReviewDoc {
        id: None,
        product_id,
        user_id: user.uid.clone(),
        user_name: user.name.unwrap_or_else(|| "Anonymous".to_string()),
        user_email: user.email.unwrap_or_default(),
        rating: rating.stars(),
        comment: input.comment.trim().to_string(),
        created_at: chrono::Utc::now(),
    };

    let id = ReviewRepository::new(state.db()).create(&doc).await?;
    doc.id = Some(id);
    info!(product_id = %product_id, "review created");
    Ok((StatusCode::CREATED, Json(doc.into())))
}

/// DELETE /api/reviews/:id (admin moderation)
#[instrument(skip(state))]
pub async fn delete_review(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_object_id(&id)?;
    if !ReviewRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("review not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
