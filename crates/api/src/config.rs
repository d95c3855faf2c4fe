//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MONGODB_URI` - MongoDB connection string
//! - `MONGODB_DATABASE` - database name (default: foxglove)
//! - `FIREBASE_PROJECT_ID` - Firebase project for ID-token verification
//! - `ADMIN_EMAILS` - comma-separated admin allowlist
//!
//! ## Optional
//! - `API_HOST` - bind address (default: 127.0.0.1)
//! - `API_PORT` - listen port (default: 4000)
//! - `CORS_ORIGINS` - comma-separated allowed origins
//! - `UPLOADS_DIR` - image upload directory (default: admin/uploads)
//! - `SQUARE_ACCESS_TOKEN`, `SQUARE_LOCATION_ID`, `SQUARE_ENVIRONMENT` -
//!   payments (routes 503 without them)
//! - `GEMINI_API_KEY`, `GEMINI_MODEL` - chatbot (status endpoint reports
//!   availability)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
//!   `SMTP_FROM`, `SHOP_OWNER_EMAIL` - order notification email
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-", "changeme", "replace", "placeholder", "example", "xxx", "insert", "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MongoDB connection string (may contain credentials).
    pub mongodb_uri: SecretString,
    /// Database name.
    pub mongodb_database: String,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Lowercased admin email allowlist.
    pub admin_emails: Vec<String>,
    /// Firebase project id (token `aud` / `iss` validation).
    pub firebase_project_id: String,
    /// Directory uploaded product images are written to.
    pub uploads_dir: String,
    /// Square payments configuration, if payments are enabled.
    pub square: Option<SquareConfig>,
    /// Gemini chatbot configuration, if the chatbot is enabled.
    pub gemini: Option<GeminiConfig>,
    /// SMTP configuration for order notifications.
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment label.
    pub sentry_environment: Option<String>,
}

/// Square payments API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SquareConfig {
    pub access_token: SecretString,
    pub location_id: String,
    /// `sandbox` or `production`; selects the API host.
    pub environment: SquareEnvironment,
}

/// Which Square host to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareEnvironment {
    Sandbox,
    Production,
}

impl SquareEnvironment {
    /// Base URL of the Square REST API for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://connect.squareupsandbox.com",
            Self::Production => "https://connect.squareup.com",
        }
    }
}

impl std::fmt::Debug for SquareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SquareConfig")
            .field("access_token", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .field("environment", &self.environment)
            .finish()
    }
}

/// Gemini API configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// SMTP configuration for order notification email.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
    /// Where order notifications land.
    pub owner_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("owner_address", &self.owner_address)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if secrets fail placeholder/entropy validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mongodb_uri = SecretString::from(get_required_env("MONGODB_URI")?);
        let mongodb_database = get_env_or_default("MONGODB_DATABASE", "foxglove");
        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;

        let cors_origins = split_list(&get_env_or_default("CORS_ORIGINS", ""));
        let admin_emails = split_list(&get_required_env("ADMIN_EMAILS")?)
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect::<Vec<_>>();
        if admin_emails.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_EMAILS".to_string(),
                "at least one admin email is required".to_string(),
            ));
        }

        let firebase_project_id = get_required_env("FIREBASE_PROJECT_ID")?;
        let uploads_dir = get_env_or_default("UPLOADS_DIR", "admin/uploads");

        Ok(Self {
            mongodb_uri,
            mongodb_database,
            host,
            port,
            cors_origins,
            admin_emails,
            firebase_project_id,
            uploads_dir,
            square: SquareConfig::from_env()?,
            gemini: GeminiConfig::from_env()?,
            email: EmailConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SquareConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(token) = get_optional_env("SQUARE_ACCESS_TOKEN") else {
            return Ok(None);
        };
        validate_secret_strength(&token, "SQUARE_ACCESS_TOKEN")?;

        let environment = match get_env_or_default("SQUARE_ENVIRONMENT", "sandbox").as_str() {
            "sandbox" => SquareEnvironment::Sandbox,
            "production" => SquareEnvironment::Production,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "SQUARE_ENVIRONMENT".to_string(),
                    format!("expected sandbox or production, got {other}"),
                ));
            }
        };

        Ok(Some(Self {
            access_token: SecretString::from(token),
            location_id: get_required_env("SQUARE_LOCATION_ID")?,
            environment,
        }))
    }
}

impl GeminiConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = get_optional_env("GEMINI_API_KEY") else {
            return Ok(None);
        };
        validate_secret_strength(&api_key, "GEMINI_API_KEY")?;

        Ok(Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("GEMINI_MODEL", "gemini-1.5-flash"),
        }))
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        let smtp_port = get_env_or_default("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("SMTP_FROM")?,
            owner_address: get_required_env("SHOP_OWNER_EMAIL")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable (empty counts as unset).
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma-separated env value into trimmed, non-empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("https://a.test, https://b.test ,"),
            vec!["https://a.test", "https://b.test"]
        );
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn test_shannon_entropy_uniform() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("EAAAl3k9-q2P8xWn4Jb7Tz0mCvH5yRdS", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_square_environment_base_url() {
        assert_eq!(
            SquareEnvironment::Sandbox.base_url(),
            "https://connect.squareupsandbox.com"
        );
        assert_eq!(
            SquareEnvironment::Production.base_url(),
            "https://connect.squareup.com"
        );
    }
}
