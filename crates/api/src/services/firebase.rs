//! Firebase ID-token verification.
//!
//! The static frontend signs users in with Firebase and sends the ID token
//! as `Authorization: Bearer <token>`. Verification is stateless: tokens
//! are RS256 JWTs signed by Google's `securetoken` service account, so the
//! server only needs Google's public JWK set (cached for an hour) plus the
//! Firebase project id for `aud`/`iss` validation.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

const GOOGLE_JWK_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const JWK_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors that can occur during token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Signature/claims validation failed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token header names a signing key we don't know.
    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    /// Could not fetch Google's JWK set.
    #[error("key fetch failed: {0}")]
    KeyFetch(#[from] reqwest::Error),
}

/// A verified Firebase user.
#[derive(Debug, Clone)]
pub struct FirebaseUser {
    /// Firebase UID (`sub` claim).
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Claims we read from a Firebase ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// One key from Google's JWK set.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// Verifies Firebase ID tokens against Google's published JWKs.
#[derive(Clone)]
pub struct FirebaseVerifier {
    inner: Arc<VerifierInner>,
}

struct VerifierInner {
    client: reqwest::Client,
    project_id: String,
    /// kid -> RSA components, refreshed when a token names an unseen kid.
    keys: Cache<String, Jwk>,
}

impl FirebaseVerifier {
    /// Create a verifier for the given Firebase project.
    #[must_use]
    pub fn new(project_id: &str) -> Self {
        Self {
            inner: Arc::new(VerifierInner {
                client: reqwest::Client::new(),
                project_id: project_id.to_string(),
                keys: Cache::builder().time_to_live(JWK_CACHE_TTL).build(),
            }),
        }
    }

    /// Verify an ID token and return the user it identifies.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the signature, audience, issuer, or expiry
    /// check fails, or if Google's key set cannot be fetched.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<FirebaseUser, AuthError> {
        let header =
            decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no kid header".to_string()))?;

        let jwk = match self.inner.keys.get(&kid).await {
            Some(jwk) => jwk,
            None => {
                self.refresh_keys().await?;
                self.inner
                    .keys
                    .get(&kid)
                    .await
                    .ok_or(AuthError::UnknownKey(kid))?
            }
        };

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.inner.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.inner.project_id
        )]);

        let data = decode::<IdTokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(FirebaseUser {
            uid: data.claims.sub,
            email: data.claims.email,
            name: data.claims.name,
        })
    }

    /// Fetch Google's current JWK set and repopulate the cache.
    async fn refresh_keys(&self) -> Result<(), AuthError> {
        let set: JwkSet = self
            .inner
            .client
            .get(GOOGLE_JWK_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for jwk in set.keys {
            self.inner.keys.insert(jwk.kid.clone(), jwk).await;
        }
        Ok(())
    }
}

/// Check whether an email is on the admin allowlist, case-insensitively.
///
/// Empty or whitespace-only input is never an admin.
#[must_use]
pub fn is_admin_email(email: &str, allowlist: &[String]) -> bool {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    allowlist.iter().any(|admin| admin == &normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist() -> Vec<String> {
        // config lowercases entries at load time
        vec![
            "iris@foxglovefarm.shop".to_string(),
            "owner@foxglovefarm.shop".to_string(),
        ]
    }

    #[test]
    fn test_is_admin_email_exact() {
        assert!(is_admin_email("iris@foxglovefarm.shop", &allowlist()));
    }

    #[test]
    fn test_is_admin_email_case_insensitive() {
        assert!(is_admin_email("Iris@FoxgloveFarm.Shop", &allowlist()));
        assert!(is_admin_email("OWNER@FOXGLOVEFARM.SHOP", &allowlist()));
    }

    #[test]
    fn test_is_admin_email_trims_whitespace() {
        assert!(is_admin_email("  iris@foxglovefarm.shop  ", &allowlist()));
    }

    #[test]
    fn test_is_admin_email_rejects_empty() {
        assert!(!is_admin_email("", &allowlist()));
        assert!(!is_admin_email("   ", &allowlist()));
    }

    #[test]
    fn test_is_admin_email_rejects_unknown() {
        assert!(!is_admin_email("visitor@example.com", &allowlist()));
    }

    #[test]
    fn test_verifier_is_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<FirebaseVerifier>();
    }
}
