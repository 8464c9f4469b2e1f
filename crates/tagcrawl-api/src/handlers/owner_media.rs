use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tagcrawl_core::MediaRecord;
use tagcrawl_services::{IngestOutcome, IngestStats};

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OwnerSyncResponse {
    pub owner_id: String,
    pub outcome: IngestOutcome,
    pub record_count: usize,
    pub records: Vec<MediaRecord>,
    pub stats: IngestStats,
}

/// Ingest the configured business account's own media.
pub async fn sync_owner_media(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OwnerSyncResponse>, HttpAppError> {
    let report = state.ingest.ingest_owner_media(&state.owner_account_id).await;

    Ok(Json(OwnerSyncResponse {
        owner_id: report.query,
        outcome: report.outcome,
        record_count: report.records.len(),
        records: report.records,
        stats: report.stats,
    }))
}
