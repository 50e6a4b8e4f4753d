//! # Request Throttling
//!
//! One token bucket shared by every route. The rate comes from
//! `[limits] rate_limit`; `STREETSCOUT_RATE_LIMIT` replaces it when set.
//! A rate of zero turns throttling off.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Unkeyed bucket: all clients draw from the same quota.
pub type SharedLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Bucket refilling `per_second` tokens a second, or `None` when the rate
/// is zero.
pub fn limiter_for(per_second: u32) -> Option<SharedLimiter> {
    NonZeroU32::new(per_second)
        .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))))
}

/// Rate from `STREETSCOUT_RATE_LIMIT`. Unset or unparsable yields `None`.
pub fn rate_limit_override() -> Option<u32> {
    std::env::var("STREETSCOUT_RATE_LIMIT")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
}

/// Answer 429 once the bucket is empty; otherwise pass the request on.
pub async fn throttle(
    State(limiter): State<SharedLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_err() {
        tracing::warn!(event = "rate_limited", path = %request.uri().path());
        return (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response();
    }
    next.run(request).await
}
