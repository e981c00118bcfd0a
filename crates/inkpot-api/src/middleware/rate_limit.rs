//! Per-client HTTP rate limiting
//!
//! Fixed one-minute windows keyed by user id when authenticated, otherwise by
//! client IP. The map is sharded to keep lock contention down under load.
//! Limits apply per process; a multi-instance deployment multiplies them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::Mutex;

use crate::auth::models::{AuthContext, ClientIp};
use crate::error::ErrorResponse;
use crate::middleware::audit::AuditLogEntry;
use crate::state::AppState;

const SHARD_COUNT: usize = 16;
const WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    count: u32,
}

/// Sharded fixed-window counter.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Arc<Vec<Mutex<HashMap<String, Window>>>>,
    limit_per_minute: u32,
}

pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_secs: u64,
}

impl HttpRateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            shards: Arc::new(shards),
            limit_per_minute,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit_per_minute
    }

    fn shard_for(&self, key: &str) -> &Mutex<HashMap<String, Window>> {
        let mut hash: usize = 0;
        for byte in key.bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(byte as usize);
        }
        &self.shards[hash % SHARD_COUNT]
    }

    pub async fn check(&self, key: &str) -> RateDecision {
        let mut shard = self.shard_for(key).lock().await;
        let now = Instant::now();

        let window = shard.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.limit_per_minute {
            let elapsed = now.duration_since(window.started);
            return RateDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: WINDOW.saturating_sub(elapsed).as_secs().max(1),
            };
        }

        window.count += 1;
        let remaining = self.limit_per_minute - window.count;

        // Drop stale windows opportunistically so idle keys do not accumulate.
        if shard.len() > 4096 {
            shard.retain(|_, w| now.duration_since(w.started) < WINDOW);
        }

        RateDecision {
            allowed: true,
            remaining,
            retry_after_secs: 0,
        }
    }
}

pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let limiter = state.rate_limiter.clone();

    // Authenticated clients are limited per user so NAT'd offices don't share
    // a budget; anonymous clients fall back to per-IP.
    let key = match request.extensions().get::<AuthContext>() {
        Some(ctx) => format!("user:{}", ctx.user.id),
        None => match request.extensions().get::<ClientIp>() {
            Some(ClientIp(ip)) => format!("ip:{ip}"),
            None => "ip:unknown".to_string(),
        },
    };

    let decision = limiter.check(&key).await;
    if !decision.allowed {
        let mut entry = AuditLogEntry::new("rate_limited")
            .outcome("rejected")
            .detail(key);
        if let Some(ctx) = request.extensions().get::<AuthContext>() {
            entry = entry.user_id(ctx.user.id);
        }
        if let Some(ClientIp(ip)) = request.extensions().get::<ClientIp>() {
            entry = entry.client_ip(*ip);
        }
        entry.log();

        return (
            StatusCode::TOO_MANY_REQUESTS,
            [
                (
                    header::RETRY_AFTER,
                    HeaderValue::from_str(&decision.retry_after_secs.to_string())
                        .unwrap_or(HeaderValue::from_static("60")),
                ),
                (
                    header::HeaderName::from_static("x-ratelimit-limit"),
                    HeaderValue::from(limiter.limit()),
                ),
                (
                    header::HeaderName::from_static("x-ratelimit-remaining"),
                    HeaderValue::from_static("0"),
                ),
            ],
            Json(ErrorResponse::new("Rate limit exceeded", "RATE_LIMITED")),
        )
            .into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(limiter.limit()));
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from(decision.remaining),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = HttpRateLimiter::new(3);
        for expected_remaining in [2u32, 1, 0] {
            let decision = limiter.check("user:abc").await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
        let decision = limiter.check("user:abc").await;
        assert!(!decision.allowed);
        assert!(decision.retry_after_secs >= 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = HttpRateLimiter::new(1);
        assert!(limiter.check("user:a").await.allowed);
        assert!(!limiter.check("user:a").await.allowed);
        assert!(limiter.check("user:b").await.allowed);
    }
}
