//! Per-client request rate limiting.
//!
//! Three tiers, each with its own in-memory sliding window keyed by client
//! IP: a loose general budget over the whole API, a tighter one for file
//! uploads, and the tightest for routes that call the LLM. The pipeline
//! itself performs no throttling; this middleware is the only gate.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::warn;

/// Upload tier: 10 uploads per 15 minutes.
pub const UPLOAD_MAX_REQUESTS: usize = 10;
pub const UPLOAD_WINDOW: Duration = Duration::from_secs(15 * 60);

/// LLM tier: 5 oracle-backed calls per minute.
pub const LLM_MAX_REQUESTS: usize = 5;
pub const LLM_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter for one tier. Cheap to clone; clones share the
/// same window map.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    message: &'static str,
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration, message: &'static str) -> Self {
        Self {
            max_requests,
            window,
            message,
            requests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn general(max_requests: usize, window: Duration) -> Self {
        Self::new(
            max_requests,
            window,
            "Too many requests from this IP, please try again later.",
        )
    }

    pub fn upload() -> Self {
        Self::new(
            UPLOAD_MAX_REQUESTS,
            UPLOAD_WINDOW,
            "Too many file uploads from this IP, please try again later.",
        )
    }

    pub fn llm() -> Self {
        Self::new(
            LLM_MAX_REQUESTS,
            LLM_WINDOW,
            "Too many AI processing requests, please try again later.",
        )
    }

    /// Records a request for `client` and reports whether it fits the
    /// window. Stale entries are pruned on the way through, and clients
    /// whose whole window has expired are dropped so the map does not
    /// grow by one entry per address seen over the process lifetime.
    pub async fn check(&self, client: &str) -> bool {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        // Timestamps are pushed in order, so a stale newest entry means
        // the whole vec is stale.
        requests.retain(|_, stamps| {
            stamps
                .last()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });

        let entry = requests.entry(client.to_string()).or_default();
        entry.retain(|&timestamp| now.duration_since(timestamp) < self.window);

        if entry.len() >= self.max_requests {
            return false;
        }

        entry.push(now);
        true
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.requests.read().await.len()
    }

    fn too_many_requests(&self) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": self.message,
                "retryAfter": self.window.as_secs(),
            })),
        )
            .into_response()
    }
}

/// Axum middleware enforcing one limiter tier. Attach per route group via
/// `middleware::from_fn_with_state`.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = extract_client_addr(&request);

    if !limiter.check(&client).await {
        warn!("Rate limit exceeded for IP: {client}");
        return limiter.too_many_requests();
    }

    next.run(request).await
}

/// Client address for window keying: first hop of `X-Forwarded-For` when a
/// proxy set it, otherwise the socket peer address.
fn extract_client_addr(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return first_ip.to_string();
                }
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limiter_allows_up_to_max() {
        let limiter = RateLimiter::llm();

        for i in 1..=LLM_MAX_REQUESTS {
            assert!(
                limiter.check("127.0.0.1").await,
                "request {i} should fit the window"
            );
        }

        assert!(!limiter.check("127.0.0.1").await);
    }

    #[tokio::test]
    async fn test_limiter_tracks_clients_independently() {
        let limiter = RateLimiter::llm();

        for _ in 0..LLM_MAX_REQUESTS {
            assert!(limiter.check("10.0.0.1").await);
        }

        assert!(!limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_window_expiry_readmits_client() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50), "limited");

        assert!(limiter.check("127.0.0.1").await);
        assert!(limiter.check("127.0.0.1").await);
        assert!(!limiter.check("127.0.0.1").await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("127.0.0.1").await);
    }

    #[tokio::test]
    async fn test_expired_clients_are_dropped_from_the_map() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50), "limited");

        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.2").await);
        assert_eq!(limiter.tracked_clients().await, 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("10.0.0.3").await);

        // The sweep removed both idle clients; only the live one remains.
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[tokio::test]
    async fn test_blocked_request_is_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50), "limited");

        assert!(limiter.check("127.0.0.1").await);
        // Rejected attempts must not extend the window
        assert!(!limiter.check("127.0.0.1").await);
        assert!(!limiter.check("127.0.0.1").await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("127.0.0.1").await);
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let request = Request::builder()
            .uri("/api/extract-profile")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_client_addr(&request), "203.0.113.7");
    }

    #[test]
    fn test_missing_peer_info_falls_back_to_unknown() {
        let request = Request::builder()
            .uri("/api/extract-profile")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_client_addr(&request), "unknown");
    }
}
