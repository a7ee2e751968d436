//! Per-staff-account rate limiting built on Governor token buckets.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use backoffice_types::Actor;

type Bucket = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One token bucket per staff account, created lazily on first request.
///
/// Unauthenticated traffic (health is exempt; bootstrap) shares a single
/// anonymous bucket.
pub struct RateLimiterState {
    buckets: DashMap<String, Arc<Bucket>>,
    quota: Quota,
    period: Duration,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Allows `requests` per `period` for each staff account.
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).expect("rate limit must be non-zero");
        Self {
            buckets: DashMap::new(),
            quota: Quota::with_period(period)
                .expect("rate limit period must be non-zero")
                .allow_burst(burst),
            period,
        }
    }

    /// Takes one token from the bucket for `key`; false means rate limited.
    pub fn allow(&self, key: &str) -> bool {
        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .check()
            .is_ok()
    }

    fn retry_after_seconds(&self) -> u64 {
        self.period.as_secs()
    }
}

/// Rate limiting middleware.
///
/// Runs after authentication, so the bucket key is the resolved staff
/// account rather than whatever the client put in the header.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = match request.extensions().get::<Actor>() {
        Some(actor) => actor.employee_id.to_string(),
        None => "anonymous".to_string(),
    };

    if !limiter.allow(&key) {
        let body = serde_json::json!({
            "error": "Rate limit exceeded. Please try again later.",
            "retry_after_seconds": limiter.retry_after_seconds()
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_exhaustion() {
        let state = RateLimiterState::new(2, Duration::from_secs(60));

        assert!(state.allow("emp-a"));
        assert!(state.allow("emp-a"));
        assert!(!state.allow("emp-a"));
    }

    #[test]
    fn test_buckets_are_isolated_per_account() {
        let state = RateLimiterState::new(1, Duration::from_secs(60));

        assert!(state.allow("emp-a"));
        assert!(state.allow("emp-b"));
        assert!(!state.allow("emp-a"));
    }
}
