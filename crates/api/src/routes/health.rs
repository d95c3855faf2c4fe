//! Liveness and readiness endpoints.

use axum::{Json, extract::State, http::StatusCode};
use mongodb::bson::doc;
use serde_json::{Value, json};
use tracing::instrument;

use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready
///
/// Pings MongoDB; 503 until the database answers.
#[instrument(skip(state))]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db().run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
