//! Admin order routes: listing and fulfillment status updates.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::{info, instrument};

use foxglove_core::OrderStatus;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::OrderView;
use crate::routes::products::parse_object_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

/// GET /api/orders
#[instrument(skip(state))]
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderRepository::new(state.db()).list().await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// PUT /api/orders/:id/status
#[instrument(skip(state, input))]
pub async fn update_order_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StatusInput>,
) -> Result<Json<OrderView>> {
    let id = parse_object_id(&id)?;
    let status = OrderStatus::from_str_opt(&input.status).ok_or_else(|| {
        AppError::BadRequest(format!(
            "status must be pending, paid, fulfilled, or cancelled, got '{}'",
            input.status
        ))
    })?;

    let repo = OrderRepository::new(state.db());
    if !repo.update_status(id, status).await? {
        return Err(AppError::NotFound("order not found".to_string()));
    }
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    info!(order_id = %id, status = ?status, "order status updated");
    Ok(Json(order.into()))
}
