//! Admin inbox routes for contact messages.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::db::MessageRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::MessageView;
use crate::routes::products::parse_object_id;
use crate::state::AppState;

/// GET /api/messages
#[instrument(skip(state))]
pub async fn list_messages(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageView>>> {
    let messages = MessageRepository::new(state.db()).list().await?;
    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}

/// PUT /api/messages/:id/read
#[instrument(skip(state))]
pub async fn mark_read(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_object_id(&id)?;
    if !MessageRepository::new(state.db()).mark_read(id).await? {
        return Err(AppError::NotFound("message not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/messages/:id
#[instrument(skip(state))]
pub async fn delete_message(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_object_id(&id)?;
    if !MessageRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("message not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
