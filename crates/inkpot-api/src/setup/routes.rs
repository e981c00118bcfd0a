//! Router assembly
//!
//! Public routes (health, register, login) sit outside the auth middleware;
//! everything else requires a Bearer token. Rate limiting runs after
//! authentication so the limiter can key by user id.

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::middleware::client_ip::resolve_client_ip;
use crate::middleware::rate_limit::enforce_rate_limit;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(state: &AppState) -> Result<CorsLayer, anyhow::Error> {
    let origins = state.config.cors_origins();
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        Ok(layer.allow_origin(Any))
    } else {
        let parsed: Result<Vec<HeaderValue>, _> =
            origins.iter().map(|o| o.parse::<HeaderValue>()).collect();
        Ok(layer.allow_origin(
            parsed.map_err(|e| anyhow::anyhow!("Invalid CORS origin: {e}"))?,
        ))
    }
}

pub fn build_router(state: AppState) -> Result<Router, anyhow::Error> {
    let public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/organizations",
            post(handlers::organizations::create).get(handlers::organizations::list),
        )
        .route(
            "/organizations/{organization_id}",
            get(handlers::organizations::get).delete(handlers::organizations::delete),
        )
        .route(
            "/organizations/{organization_id}/members",
            get(handlers::organizations::members),
        )
        .route(
            "/organizations/{organization_id}/invitations",
            post(handlers::invitations::invite).get(handlers::invitations::list),
        )
        .route(
            "/organizations/{organization_id}/invitations/{invitation_id}",
            delete(handlers::invitations::cancel),
        )
        .route(
            "/invitations/{token}/accept",
            post(handlers::invitations::accept),
        )
        .route(
            "/invitations/{token}/decline",
            post(handlers::invitations::decline),
        )
        .route(
            "/organizations/{organization_id}/projects",
            post(handlers::projects::create).get(handlers::projects::list),
        )
        .route(
            "/organizations/{organization_id}/projects/{project_id}",
            get(handlers::projects::get)
                .patch(handlers::projects::update)
                .delete(handlers::projects::delete),
        )
        .route(
            "/organizations/{organization_id}/activity",
            get(handlers::activity::list_for_organization),
        )
        .route(
            "/posts",
            post(handlers::posts::create).get(handlers::posts::list),
        )
        .route(
            "/posts/{post_id}",
            get(handlers::posts::get)
                .patch(handlers::posts::update)
                .delete(handlers::posts::delete),
        )
        .route("/ai/generate", post(handlers::ai_content::generate))
        .route("/ai/history", get(handlers::ai_content::history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new().merge(public).merge(protected);

    let router = Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_client_ip,
        ))
        .layer(cors_layer(&state)?)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state);

    Ok(router)
}
