use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::{error::AppError, state::AppState};

/// The length of one rate-limit window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// The maximum number of requests a single client may make per window.
pub const MAX_REQUESTS: u32 = 10;

/// Request accounting for one client within the current window.
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// A fixed-window request rate limiter keyed by client identifier.
///
/// The window is a resettable bucket, not a sliding log: once the elapsed
/// time since `window_start` exceeds the window length, the whole budget
/// resets. Entries live for the lifetime of the process; there is no
/// eviction. All clients without an identifiable address share the single
/// `"unknown"` bucket.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
    window: Duration,
    max_requests: u32,
}

impl FixedWindowLimiter {
    /// Creates a limiter with the standard window and ceiling.
    pub fn new() -> Self {
        Self::with_limits(WINDOW, MAX_REQUESTS)
    }

    /// Creates a limiter with an explicit window and ceiling.
    pub fn with_limits(window: Duration, max_requests: u32) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    /// Records a request from `client_key` and returns whether it is admitted.
    pub fn check(&self, client_key: &str) -> bool {
        self.check_at(client_key, Instant::now())
    }

    /// Records a request observed at `now`. Split out from [`check`] so the
    /// window-reset behavior is testable without waiting out real time.
    ///
    /// [`check`]: FixedWindowLimiter::check
    pub(crate) fn check_at(&self, client_key: &str, now: Instant) -> bool {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match entries.get_mut(client_key) {
            Some(entry) if now.duration_since(entry.window_start) <= self.window => {
                entry.count += 1;
                entry.count <= self.max_requests
            }
            _ => {
                entries.insert(
                    client_key.to_string(),
                    WindowEntry {
                        count: 1,
                        window_start: now,
                    },
                );
                true
            }
        }
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the client identifier for rate limiting.
///
/// Prefers the first entry of the `x-forwarded-for` header, then the peer
/// address, then the literal `"unknown"` (all unidentified clients share one
/// bucket).
fn extract_client_key(req: &Request<Body>) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// A middleware that bounds the request rate per client.
///
/// # Arguments
///
/// * `state` - The application state owning the limiter.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The wrapped handler's response, or a 429 rejection.
pub async fn limit_requests(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client_key = extract_client_key(&req);

    if !state.rate_limiter.check(&client_key) {
        tracing::warn!("❌ Rate limit exceeded for client: {}", client_key);
        return AppError::RateLimited.into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_request_in_window_is_rejected() {
        let limiter = FixedWindowLimiter::new();
        for i in 1..=10 {
            assert!(limiter.check("203.0.113.7"), "request {} should pass", i);
        }
        assert!(!limiter.check("203.0.113.7"));
    }

    #[test]
    fn budget_resets_after_window_elapses() {
        let limiter = FixedWindowLimiter::new();
        let start = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check_at("203.0.113.7", start));
        }
        assert!(!limiter.check_at("203.0.113.7", start));

        // 61s after the window opened the bucket resets and counts from 1.
        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("203.0.113.7", later));
    }

    #[test]
    fn distinct_clients_have_independent_budgets() {
        let limiter = FixedWindowLimiter::new();
        for _ in 0..10 {
            assert!(limiter.check("198.51.100.1"));
        }
        assert!(!limiter.check("198.51.100.1"));

        for i in 1..=10 {
            assert!(limiter.check("198.51.100.2"), "request {} should pass", i);
        }
    }

    #[test]
    fn unidentified_clients_share_one_bucket() {
        let limiter = FixedWindowLimiter::with_limits(Duration::from_secs(60), 2);
        assert!(limiter.check("unknown"));
        assert!(limiter.check("unknown"));
        assert!(!limiter.check("unknown"));
    }
}
