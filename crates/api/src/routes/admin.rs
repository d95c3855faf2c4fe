//! Admin identity check used by the frontend to reveal management UI.

use axum::Json;
use serde::Serialize;
use tracing::instrument;

use crate::middleware::RequireAdmin;

#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub admin: bool,
    pub email: Option<String>,
}

/// GET /api/admin/check
///
/// Reaching the handler at all means the token belongs to an allowlisted
/// admin; non-admins get 401/403 from the extractor.
#[instrument(skip(admin), fields(uid = %admin.0.uid))]
pub async fn check(admin: RequireAdmin) -> Json<AdminCheckResponse> {
    Json(AdminCheckResponse {
        admin: true,
        email: admin.0.email,
    })
}
