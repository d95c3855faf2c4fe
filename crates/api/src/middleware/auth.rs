//! Authentication extractors for route handlers.
//!
//! Requests authenticate with a Firebase ID token in the
//! `Authorization: Bearer` header. There is no server-side session; every
//! request is verified against Google's published signing keys.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::{FirebaseUser, is_admin_email};
use crate::state::AppState;

/// Extractor that requires a signed-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("hello {}", user.uid)
/// }
/// ```
pub struct RequireUser(pub FirebaseUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = state.verifier().verify(token).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires a signed-in user whose email is on the admin
/// allowlist. Rejects with 401 for bad tokens and 403 for non-admins.
pub struct RequireAdmin(pub FirebaseUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        let email = user.email.as_deref().unwrap_or_default();
        if !is_admin_email(email, state.admin_emails()) {
            return Err(AppError::Forbidden(
                "admin access required".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

/// Extractor that yields the admin user when a valid admin token is
/// present, and `None` otherwise. The chatbot uses this to decide between
/// customer and management mode; a missing or bad token is not an error
/// there, it just means customer mode.
pub struct OptionalAdmin(pub Option<FirebaseUser>);

impl FromRequestParts<AppState> for OptionalAdmin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = match RequireAdmin::from_request_parts(parts, state).await {
            Ok(RequireAdmin(user)) => Some(user),
            Err(_) => None,
        };
        Ok(Self(admin))
    }
}

/// Pull the token out of the `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AppError::Auth(
            crate::services::AuthError::MissingToken,
        ))?;
    let value = header
        .to_str()
        .map_err(|_| AppError::Auth(crate::services::AuthError::MissingToken))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Auth(crate::services::AuthError::MissingToken))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/orders");
        if let Some(value) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracts_value() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).expect("token"), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(bearer_token(&parts).is_err());
    }
}
