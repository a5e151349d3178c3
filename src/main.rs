//! # Juz Tracker Main Entry Point

use anyhow::Context;
use juz_tracker::{
    config::ConfigLoader,
    db::{init_pool, run_migrations},
    identity::identity_provider_from_config,
    server::{AppState, run_server},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;
    run_migrations(&db).await?;

    let identity = identity_provider_from_config(&config)?;
    let state = AppState::new(config, db, identity);

    run_server(state).await
}
