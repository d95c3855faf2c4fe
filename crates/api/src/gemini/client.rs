//! Gemini API client.
//!
//! Non-streaming `generateContent` access; the chatbot composes a full
//! reply (and possibly an action block) before responding, so streaming
//! buys nothing here.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GeminiConfig;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{Content, GenerateRequest, GenerateResponse, GenerationConfig};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GeminiClientInner {
                client,
                model: config.model.clone(),
                base_url: GEMINI_API_BASE.to_string(),
            }),
        }
    }

    /// Send a conversation and return the model's text reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// model returns no candidates.
    #[instrument(skip(self, contents, system), fields(model = %self.inner.model))]
    pub async fn generate(
        &self,
        contents: Vec<Content>,
        system: Option<String>,
    ) -> Result<String, GeminiError> {
        let request = GenerateRequest {
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![super::types::Part { text }],
            }),
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
                temperature: None,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.inner.base_url, self.inner.model
        );
        let response = self.inner.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(GeminiError::RateLimited);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => GeminiError::Api {
                    status: api_error.error.status,
                    message: api_error.error.message,
                },
                Err(_) => GeminiError::Api {
                    status: status.to_string(),
                    message: body,
                },
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::Parse(format!("failed to parse response: {e}")))?;

        let text = parsed.text();
        if text.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<GeminiClient>();
    }
}
