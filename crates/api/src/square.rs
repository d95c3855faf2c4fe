//! Minimal Square Payments API client.
//!
//! Only the `CreatePayment` endpoint is used: the checkout flow charges a
//! card nonce produced by Square's Web Payments SDK on the storefront.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::SquareConfig;

/// Errors from the Square API.
#[derive(Debug, Error)]
pub enum SquareError {
    /// HTTP transport error.
    #[error("Square request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Square rejected the payment.
    #[error("Square declined the payment: {0}")]
    Declined(String),

    /// Square returned a non-success status with an error envelope.
    #[error("Square API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Unexpected Square response: {0}")]
    Parse(String),
}

/// A completed charge.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub status: String,
}

#[derive(Serialize)]
struct CreatePaymentRequest<'a> {
    source_id: &'a str,
    idempotency_key: String,
    amount_money: Money,
    location_id: &'a str,
}

#[derive(Serialize)]
struct Money {
    /// Smallest currency unit, cents for USD.
    amount: i64,
    currency: &'static str,
}

#[derive(Deserialize)]
struct CreatePaymentResponse {
    payment: Option<PaymentBody>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Deserialize)]
struct PaymentBody {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    detail: String,
}

/// Client for Square's payments endpoint. Cheap to clone.
#[derive(Clone)]
pub struct SquareClient {
    inner: Arc<SquareClientInner>,
}

struct SquareClientInner {
    client: reqwest::Client,
    base_url: String,
    location_id: String,
}

impl SquareClient {
    /// Create a new Square client.
    ///
    /// # Panics
    ///
    /// Panics if the access token is not a valid header value, which the
    /// config layer has already ruled out.
    #[must_use]
    pub fn new(config: &SquareConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.access_token.expose_secret()
        ))
        .expect("valid access token header");
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("reqwest client");

        Self {
            inner: Arc::new(SquareClientInner {
                client,
                base_url: config.environment.base_url().to_string(),
                location_id: config.location_id.clone(),
            }),
        }
    }

    /// Charge `amount_cents` against a card nonce from the Web Payments SDK.
    ///
    /// A fresh idempotency key is generated per call, so retrying a failed
    /// request from our side creates a new payment attempt rather than
    /// replaying an old one.
    ///
    /// # Errors
    ///
    /// Returns [`SquareError::Declined`] when Square refuses the charge and
    /// [`SquareError::Api`] for other API failures.
    #[instrument(skip(self, source_id), fields(amount_cents))]
    pub async fn charge(&self, source_id: &str, amount_cents: i64) -> Result<Payment, SquareError> {
        let request = CreatePaymentRequest {
            source_id,
            idempotency_key: Uuid::new_v4().to_string(),
            amount_money: Money {
                amount: amount_cents,
                currency: "USD",
            },
            location_id: &self.inner.location_id,
        };

        let response = self
            .inner
            .client
            .post(format!("{}/v2/payments", self.inner.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body: CreatePaymentResponse = response
            .json()
            .await
            .map_err(|e| SquareError::Parse(e.to_string()))?;

        if !status.is_success() {
            let message = body
                .errors
                .first()
                .map_or_else(|| "unknown error".to_string(), ApiError::describe);
            if body.errors.iter().any(ApiError::is_decline) {
                return Err(SquareError::Declined(message));
            }
            return Err(SquareError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payment = body
            .payment
            .ok_or_else(|| SquareError::Parse("missing payment in response".to_string()))?;
        Ok(Payment {
            id: payment.id,
            status: payment.status,
        })
    }
}

impl ApiError {
    fn describe(&self) -> String {
        if self.detail.is_empty() {
            self.code.clone()
        } else {
            format!("{}: {}", self.code, self.detail)
        }
    }

    fn is_decline(&self) -> bool {
        matches!(
            self.code.as_str(),
            "CARD_DECLINED"
                | "CVV_FAILURE"
                | "ADDRESS_VERIFICATION_FAILURE"
                | "INSUFFICIENT_FUNDS"
                | "GENERIC_DECLINE"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payment_request_shape() {
        let request = CreatePaymentRequest {
            source_id: "cnon:card-nonce",
            idempotency_key: "key-1".to_string(),
            amount_money: Money {
                amount: 2450,
                currency: "USD",
            },
            location_id: "L123",
        };
        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(value["source_id"], "cnon:card-nonce");
        assert_eq!(value["amount_money"]["amount"], 2450);
        assert_eq!(value["amount_money"]["currency"], "USD");
        assert_eq!(value["location_id"], "L123");
    }

    #[test]
    fn test_decline_codes() {
        let declined = ApiError {
            code: "CARD_DECLINED".to_string(),
            detail: "Card declined.".to_string(),
        };
        assert!(declined.is_decline());
        assert_eq!(declined.describe(), "CARD_DECLINED: Card declined.");

        let other = ApiError {
            code: "UNAUTHORIZED".to_string(),
            detail: String::new(),
        };
        assert!(!other.is_decline());
        assert_eq!(other.describe(), "UNAUTHORIZED");
    }

    #[test]
    fn test_parses_error_envelope() {
        let body: CreatePaymentResponse = serde_json::from_str(
            r#"{"errors":[{"category":"PAYMENT_METHOD_ERROR","code":"CARD_DECLINED","detail":"declined"}]}"#,
        )
        .expect("parses");
        assert!(body.payment.is_none());
        assert_eq!(body.errors.len(), 1);
        assert!(body.errors[0].is_decline());
    }
}
