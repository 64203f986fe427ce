//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Auth endpoints (register/login) get a per-IP limiter to slow down
//! brute-force and enumeration attempts. The window and request count are
//! configurable via `PHONEBOOK_RATE_LIMIT_WINDOW_SECS` and
//! `PHONEBOOK_RATE_LIMIT_MAX`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that checks standard proxy headers first, then falls back
/// to the peer address recorded by `into_make_service_with_connect_info`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // Try X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Fall back to the TCP peer address
        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Err(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints.
///
/// Allows `max_requests` per `window_secs` per client IP, with the full
/// allowance available as a burst.
///
/// # Panics
///
/// This function will not panic. The replenish interval is clamped to at
/// least one second and the burst size to at least one request, which are
/// always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(window_secs: u64, max_requests: u32) -> RateLimiterLayer {
    let replenish_secs = (window_secs / u64::from(max_requests.max(1))).max(1);
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(max_requests.max(1))
        .finish()
        .expect("rate limiter config with positive interval and burst size is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request() -> Request<()> {
        Request::builder().uri("/api/login").body(()).unwrap()
    }

    #[test]
    fn test_extracts_forwarded_for_first_hop() {
        let mut req = request();
        req.headers_mut().insert(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1".parse().unwrap(),
        );

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extracts_real_ip() {
        let mut req = request();
        req.headers_mut()
            .insert("x-real-ip", "198.51.100.4".parse().unwrap());

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request();
        let peer: SocketAddr = "192.0.2.9:51234".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, peer.ip());
    }

    #[test]
    fn test_no_key_without_ip_information() {
        let req = request();
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
