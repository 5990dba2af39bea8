//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the credential endpoints under `/api/auth` are limited; they are the
//! ones worth brute forcing.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client IP.
///
/// Uses the TCP peer address. Proxy headers are only read when the server is
/// configured to trust them, since any client can set them otherwise.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers
            && let Some(ip) = forwarded_ip(req.headers())
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Client IP as reported by a reverse proxy.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    // Cloudflare sets this to the connecting client
    header_ip("cf-connecting-ip")
        // X-Forwarded-For (first IP in the chain)
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
        .or_else(|| header_ip("x-real-ip"))
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints.
///
/// Each client may make `burst` attempts back to back, then one more every
/// `replenish_secs` seconds. The defaults are 5 and 6 (~10/minute).
///
/// # Panics
///
/// Panics if `burst` or `replenish_secs` is zero. `StorefrontConfig::from_env`
/// rejects both.
#[must_use]
pub fn auth_rate_limiter(limits: &RateLimitConfig) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers: limits.trust_proxy_headers,
        })
        .per_second(limits.replenish_secs)
        .burst_size(limits.burst)
        .finish()
        .expect("rate limiter config with non-zero burst and replenish interval is valid");
    GovernorLayer::new(Arc::new(config))
}
