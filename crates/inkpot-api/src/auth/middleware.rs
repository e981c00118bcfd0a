//! Bearer-token authentication middleware
//!
//! Verifies the JWT, loads the user, and inserts [`AuthContext`] and
//! [`ClientIp`] into request extensions. Repeated failures from one IP are
//! throttled before any token work happens, which also slows credential
//! stuffing against the login route's JWT sibling here.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::Mutex;

use crate::auth::jwt;
use crate::auth::models::{AuthContext, ClientIp};
use crate::error::ErrorResponse;
use crate::middleware::audit::AuditLogEntry;
use crate::state::AppState;
use crate::utils::ip_extraction::extract_client_ip;

/// Sliding-window counter of authentication failures per client IP.
///
/// Shared between this middleware and the login handler so password failures
/// and bad tokens draw from the same budget.
#[derive(Clone)]
pub struct AuthFailureLimiter {
    inner: Arc<Mutex<HashMap<IpAddr, FailureWindow>>>,
    limit_per_minute: u32,
}

struct FailureWindow {
    window_start: Instant,
    count: u32,
}

impl AuthFailureLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            limit_per_minute,
        }
    }

    /// Returns false when the IP has exhausted its failure budget.
    pub async fn check(&self, ip: IpAddr) -> bool {
        let map = self.inner.lock().await;
        match map.get(&ip) {
            Some(window) if window.window_start.elapsed() < Duration::from_secs(60) => {
                window.count < self.limit_per_minute
            }
            _ => true,
        }
    }

    pub async fn record_failure(&self, ip: IpAddr) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        let window = map.entry(ip).or_insert(FailureWindow {
            window_start: now,
            count: 0,
        });
        if window.window_start.elapsed() >= Duration::from_secs(60) {
            window.window_start = now;
            window.count = 0;
        }
        window.count += 1;

        // Opportunistic cleanup so the map doesn't grow without bound.
        if map.len() > 10_000 {
            map.retain(|_, w| w.window_start.elapsed() < Duration::from_secs(60));
        }
    }

    pub async fn record_success(&self, ip: IpAddr) {
        let mut map = self.inner.lock().await;
        map.remove(&ip);
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message, "UNAUTHORIZED")),
    )
        .into_response()
}

fn too_many_failures() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "60")],
        Json(ErrorResponse::new(
            "Too many failed authentication attempts",
            "AUTH_RATE_LIMITED",
        )),
    )
        .into_response()
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let limiter = state.auth_failures.clone();
    let client_ip = match request.extensions().get::<ClientIp>() {
        Some(ClientIp(ip)) => *ip,
        None => extract_client_ip(request.headers(), state.config.trusted_proxy_count()),
    };
    request.extensions_mut().insert(ClientIp(client_ip));

    if !limiter.check(client_ip).await {
        AuditLogEntry::new("auth_throttled")
            .client_ip(client_ip)
            .outcome("denied")
            .log();
        return too_many_failures();
    }

    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            limiter.record_failure(client_ip).await;
            return unauthorized("Missing bearer token");
        }
    };

    let claims = match jwt::verify_token(state.config.jwt_secret(), token) {
        Ok(claims) => claims,
        Err(_) => {
            limiter.record_failure(client_ip).await;
            AuditLogEntry::new("auth_failed")
                .client_ip(client_ip)
                .outcome("invalid_token")
                .log();
            return unauthorized("Invalid or expired session token");
        }
    };

    let user = match state.users.find_by_id(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            limiter.record_failure(client_ip).await;
            return unauthorized("Invalid or expired session token");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load user during authentication");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
                .into_response();
        }
    };

    if !user.is_active {
        AuditLogEntry::new("auth_failed")
            .user_id(user.id)
            .client_ip(client_ip)
            .outcome("inactive_account")
            .log();
        return unauthorized("Account is deactivated");
    }

    limiter.record_success(client_ip).await;
    request.extensions_mut().insert(AuthContext { user });
    next.run(request).await
}

fn bearer_token<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limiter_allows_under_limit() {
        let limiter = AuthFailureLimiter::new(3);
        let ip: IpAddr = "10.0.0.1".parse().expect("ip");
        for _ in 0..2 {
            limiter.record_failure(ip).await;
        }
        assert!(limiter.check(ip).await);
    }

    #[tokio::test]
    async fn test_limiter_blocks_at_limit() {
        let limiter = AuthFailureLimiter::new(3);
        let ip: IpAddr = "10.0.0.2".parse().expect("ip");
        for _ in 0..3 {
            limiter.record_failure(ip).await;
        }
        assert!(!limiter.check(ip).await);
    }

    #[tokio::test]
    async fn test_success_clears_failures() {
        let limiter = AuthFailureLimiter::new(1);
        let ip: IpAddr = "10.0.0.3".parse().expect("ip");
        limiter.record_failure(ip).await;
        assert!(!limiter.check(ip).await);
        limiter.record_success(ip).await;
        assert!(limiter.check(ip).await);
    }
}
