//! Application state shared by every handler.

use std::sync::Arc;

use tagcrawl_core::SearchMode;
use tagcrawl_services::{GalleryService, IngestionCoordinator, Storage};
use tagcrawl_worker::JobQueue;

/// Parameters of the inline ingestion run behind `POST /api/search`.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub inline_limit: usize,
    pub default_mode: SearchMode,
    pub platform: String,
}

#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestionCoordinator,
    pub gallery: GalleryService,
    pub storage: Arc<dyn Storage>,
    /// Present when `SQS_QUEUE_URL` is configured.
    pub job_queue: Option<Arc<dyn JobQueue>>,
    pub search: SearchSettings,
    /// Business account whose own media `POST /api/owner-media/sync` ingests.
    pub owner_account_id: String,
    pub environment: String,
}
