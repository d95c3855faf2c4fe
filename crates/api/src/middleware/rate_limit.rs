//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Two tiers: a strict limiter for endpoints that write or call paid
//! upstreams (contact form, chatbot, payments) and a relaxed limiter for
//! everything else.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that resolves the real client IP behind a reverse proxy,
/// preferring `X-Forwarded-For`, then `X-Real-IP`.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For: first IP in the chain is the client.
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Err(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter for the contact form, chatbot, and checkout: ~10/minute per IP.
///
/// # Panics
///
/// Will not panic; `per_second(6)` and `burst_size(5)` are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn strict_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Limiter for general API traffic: ~100/minute per IP with a burst of 50.
///
/// # Panics
///
/// Will not panic; `per_second(1)` and `burst_size(50)` are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request_with(header: &str, value: &str) -> Request<()> {
        Request::builder()
            .header(header, value)
            .body(())
            .expect("request")
    }

    #[test]
    fn test_forwarded_for_takes_first_ip() {
        let req = request_with("x-forwarded-for", "203.0.113.9, 10.0.0.1");
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "203.0.113.9".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request_with("x-real-ip", "198.51.100.4");
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "198.51.100.4".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn test_no_headers_is_an_error() {
        let req = Request::builder().body(()).expect("request");
        assert!(ProxyIpKeyExtractor.extract(&req).is_err());
    }
}
