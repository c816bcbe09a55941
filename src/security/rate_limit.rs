//! Per-client fixed-window rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::http::response::RelayError;

pub const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
pub const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
pub const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Hits recorded for one client in its current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Outcome of recording one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up.
    pub fn reset_secs(&self) -> u64 {
        self.reset_after.as_secs_f64().ceil() as u64
    }

    /// Write the standard `RateLimit-*` headers.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(self.reset_secs()));
    }
}

/// In-memory limiter keyed by client IP.
///
/// A client's window opens on its first request and lasts `window`; every
/// request in it counts, rejected ones included.
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `client` now.
    pub fn check(&self, client: IpAddr) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    /// Record a request from `client` at `now`.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> RateLimitDecision {
        // The entry guard holds the shard lock, so the read-modify-write is atomic per key.
        let mut entry = self.windows.entry(client).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.hits = 0;
        }
        entry.hits = entry.hits.saturating_add(1);

        let elapsed = now.duration_since(entry.started);
        RateLimitDecision {
            allowed: entry.hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.hits),
            reset_after: self.window.saturating_sub(elapsed),
        }
    }

    /// Drop windows that have fully elapsed.
    pub fn prune_at(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }

    /// Number of clients with a live window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Periodically evict expired windows until shutdown.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, mut shutdown: broadcast::Receiver<()>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    limiter.prune_at(Instant::now());
                    tracing::debug!(clients = limiter.tracked_clients(), "Rate limit windows pruned");
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

/// Middleware applying the limiter to every request.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Without connect info (e.g. in-process tests) all callers share one bucket.
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let decision = limiter.check(client);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "Rate limit exceeded");
        let mut response = RelayError::RateLimited.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.reset_secs()));
        response
    };

    decision.apply_headers(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn sixty_first_request_in_window_is_rejected() {
        let limiter = RateLimiter::new(60, Duration::from_secs(60));
        let start = Instant::now();

        for i in 0..60 {
            let d = limiter.check_at(ip(1), start + Duration::from_millis(i * 100));
            assert!(d.allowed, "request {} should pass", i + 1);
        }
        let d = limiter.check_at(ip(1), start + Duration::from_secs(30));
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.reset_secs(), 30);
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at(ip(1), now).allowed);
        assert!(!limiter.check_at(ip(1), now).allowed);
        assert!(limiter.check_at(ip(2), now).allowed);
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at(ip(1), start);
        limiter.check_at(ip(1), start);
        assert!(!limiter.check_at(ip(1), start + Duration::from_secs(59)).allowed);

        let d = limiter.check_at(ip(1), start + Duration::from_secs(60));
        assert!(d.allowed);
        assert_eq!(d.remaining, 1);
        assert_eq!(d.reset_secs(), 60);
    }

    #[test]
    fn remaining_counts_down() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        let remaining: Vec<u32> = (0..4).map(|_| limiter.check_at(ip(1), now).remaining).collect();
        assert_eq!(remaining, vec![2, 1, 0, 0]);
    }

    #[test]
    fn prune_drops_only_expired_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at(ip(1), start);
        limiter.check_at(ip(2), start + Duration::from_secs(30));

        limiter.prune_at(start + Duration::from_secs(61));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn headers_are_written() {
        let decision = RateLimitDecision {
            allowed: true,
            limit: 60,
            remaining: 59,
            reset_after: Duration::from_millis(59_500),
        };
        let mut headers = HeaderMap::new();
        decision.apply_headers(&mut headers);
        assert_eq!(headers[RATELIMIT_LIMIT], "60");
        assert_eq!(headers[RATELIMIT_REMAINING], "59");
        assert_eq!(headers[RATELIMIT_RESET], "60");
    }
}
