//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tagcrawl_core::Config;
use tagcrawl_worker::QueueConsumer;

/// Everything `main` needs to run the process.
pub struct App {
    pub state: Arc<AppState>,
    pub router: axum::Router,
    /// In-process crawl queue consumer, when the queue is configured and enabled.
    pub queue_consumer: Option<QueueConsumer>,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<App> {
    crate::telemetry::init_telemetry(config.is_production())
        .context("Failed to initialize telemetry")?;

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    crate::error::set_production_mode(config.is_production());
    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let services = services::initialize_services(&config, pool, storage).await?;
    let queue_consumer = services::start_queue_consumer(&config, &services);

    let router = routes::setup_routes(&config, services.state.clone())?;

    Ok(App {
        state: services.state,
        router,
        queue_consumer,
    })
}
