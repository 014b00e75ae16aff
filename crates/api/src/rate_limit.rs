//! Global admission control.
//!
//! A single token bucket shared by every request. Tokens refill lazily from
//! the elapsed monotonic time each time a request asks for one, so there is
//! no background task. Refill and take happen in one critical section.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use tracing::warn;

use crate::app::errors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Bucket size; also the number of requests admitted per window.
    pub capacity: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 600,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Allowed,
    /// `retry_after` is the time until one token is back.
    Denied { retry_after: Duration },
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    window: Duration,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Starts full.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::new_at(config, Instant::now())
    }

    pub fn new_at(config: RateLimitConfig, now: Instant) -> Self {
        let capacity = f64::from(config.capacity);
        let window = config.window.as_secs_f64();
        let refill_per_sec = if window > 0.0 { capacity / window } else { 0.0 };

        Self {
            capacity,
            refill_per_sec,
            window: config.window,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: now,
            }),
        }
    }

    pub fn try_acquire(&self) -> Admission {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&self, now: Instant) -> Admission {
        let mut bucket = self.bucket.lock();
        self.refill(&mut bucket, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Admission::Allowed;
        }

        let missing = 1.0 - bucket.tokens;
        let retry_after = if self.refill_per_sec > 0.0 {
            Duration::try_from_secs_f64(missing / self.refill_per_sec).unwrap_or(self.window)
        } else {
            self.window
        };
        Admission::Denied { retry_after }
    }

    /// Tokens currently available (after a refill at `now`).
    pub fn available_at(&self, now: Instant) -> f64 {
        let mut bucket = self.bucket.lock();
        self.refill(&mut bucket, now);
        bucket.tokens
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        // A clock reading older than the last refill adds nothing and does
        // not move the reference point back.
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if elapsed.is_zero() {
            return;
        }
        let refilled = bucket.tokens + elapsed.as_secs_f64() * self.refill_per_sec;
        bucket.tokens = refilled.clamp(0.0, self.capacity);
        bucket.last_refill = now;
    }
}

/// Rejects the request with `429 Too Many Requests` once the bucket is dry.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match limiter.try_acquire() {
        Admission::Allowed => next.run(request).await,
        Admission::Denied { retry_after } => {
            let seconds = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                retry_after_secs = seconds,
                "rate limit exceeded"
            );

            let mut response = errors::json_error(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                "too many requests, please slow down",
            );
            response.headers_mut().insert(RETRY_AFTER, HeaderValue::from(seconds));
            response
        }
    }
}
