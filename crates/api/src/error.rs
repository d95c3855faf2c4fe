//! Unified error handling with optional Sentry capture.
//!
//! Route handlers return `Result<T, AppError>`; the `IntoResponse` impl
//! maps each variant to an HTTP status and a JSON `{"error": "..."}` body,
//! hiding internals from clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::gemini::GeminiError;
use crate::services::email::EmailError;
use crate::services::firebase::AuthError;
use crate::square::SquareError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Token verification failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Square payment failed.
    #[error("Square error: {0}")]
    Square(#[from] SquareError),

    /// Gemini API failed.
    #[error("Gemini error: {0}")]
    Gemini(#[from] GeminiError),

    /// Email delivery failed; only surfaced for endpoints where email is
    /// the primary effect (the contact form is best-effort instead).
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No valid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credentials, insufficient privilege (not on admin allowlist).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from the client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Uniqueness violation (duplicate review).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A feature whose upstream (Square/Gemini/SMTP) is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidId(id) => Self::BadRequest(format!("invalid id: {id}")),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry.
        if matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Square(SquareError::Http(_) | SquareError::Api { .. } | SquareError::Parse(_))
                | Self::Gemini(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Email(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Square(SquareError::Declined(_)) => StatusCode::PAYMENT_REQUIRED,
            Self::Square(_) | Self::Gemini(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Don't expose internal details to clients.
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Email(_) => {
                "Internal server error".to_string()
            }
            Self::Square(SquareError::Declined(_)) => "Payment was declined".to_string(),
            Self::Square(_) => "Payment processing failed".to_string(),
            Self::Gemini(_) => "Assistant is unavailable right now".to_string(),
            Self::Auth(_) => "Invalid or expired credentials".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("product".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("no token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("not an admin".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::BadRequest("price".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("already reviewed".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::ServiceUnavailable("payments".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_conflict_maps_to_conflict() {
        let err: AppError =
            crate::db::RepositoryError::Conflict("you have already reviewed this product".into())
                .into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let response = AppError::Internal("mongo uri leaked".into()).into_response();
        // Body is a fixed string; the detail must never reach clients.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
