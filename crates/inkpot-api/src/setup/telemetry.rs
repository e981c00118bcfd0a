//! Tracing subscriber initialization
//!
//! `RUST_LOG` controls filtering; production gets JSON lines, development a
//! human-readable format. The `audit` target rides the same subscriber and
//! can be routed separately via `RUST_LOG=audit=info`.

use inkpot_core::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    // try_init: tests spin the app up repeatedly in one process
    if config.is_production() {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init();
    }
}
