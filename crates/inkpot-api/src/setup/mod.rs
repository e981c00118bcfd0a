//! Application setup: telemetry, database, services, routes, server.

pub mod database;
pub mod routes;
pub mod server;
pub mod telemetry;

use std::sync::Arc;

use inkpot_core::Config;

use crate::services::content::AnthropicGenerator;
use crate::services::email::EmailService;
use crate::state::AppState;

/// Wire the whole application together. Returns the shared state (tests use
/// it directly) and the ready-to-serve router.
pub async fn initialize_app(config: Config) -> Result<(AppState, axum::Router), anyhow::Error> {
    telemetry::init(&config);

    let pool = database::connect_and_migrate(&config).await?;

    let email = EmailService::from_config(&config);
    if email.is_none() {
        tracing::info!("SMTP not configured, invitation emails disabled");
    }

    let generator = match config.anthropic_api_key() {
        Some(api_key) => Some(Arc::new(AnthropicGenerator::new(
            api_key.to_string(),
            config.anthropic_model().to_string(),
        )) as Arc<dyn crate::services::content::TextGenerator>),
        None => {
            tracing::info!("ANTHROPIC_API_KEY not set, AI content generation disabled");
            None
        }
    };

    let state = AppState::new(config, pool, email, generator);
    let router = routes::build_router(state.clone())?;

    Ok((state, router))
}
