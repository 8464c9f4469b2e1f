//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tagcrawl_core::Config;
use tagcrawl_services::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing content store...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize content store")?;
    tracing::info!(
        backend = %storage.backend_type(),
        container = %storage.container(),
        "Content store initialized successfully"
    );
    Ok(storage)
}
