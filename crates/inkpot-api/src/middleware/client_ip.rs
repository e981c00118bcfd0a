//! Client IP resolution layer
//!
//! Applied to the whole router, ahead of authentication and rate limiting,
//! so every downstream layer and handler reads the same resolved address.

use axum::{extract::State, middleware::Next, response::Response};

use crate::auth::models::ClientIp;
use crate::state::AppState;
use crate::utils::ip_extraction::extract_client_ip;

pub async fn resolve_client_ip(
    State(state): State<AppState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(request.headers(), state.config.trusted_proxy_count());
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}
