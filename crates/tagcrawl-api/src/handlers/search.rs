use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tagcrawl_core::{normalize_tag, AppError};
use tagcrawl_services::{GalleryImage, IngestOutcome};
use tagcrawl_worker::CrawlMessage;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub hashtag: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_term: String,
    pub queued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub message: String,
    pub outcome: IngestOutcome,
    pub new_images: Vec<GalleryImage>,
}

/// Queue a full crawl for the hashtag and run a small inline ingestion so the
/// caller sees fresh images immediately.
///
/// The queued and inline runs are independent; the dedup gate keeps them from
/// indexing the same media twice.
#[tracing::instrument(skip(state, request), fields(tag = tracing::field::Empty))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<Json<SearchResponse>, HttpAppError> {
    let tag = normalize_tag(&request.hashtag);
    if tag.is_empty() {
        return Err(AppError::InvalidInput("Hashtag must not be empty".to_string()).into());
    }
    tracing::Span::current().record("tag", tag.as_str());

    let (queued, message_id, message) = match &state.job_queue {
        Some(queue) => {
            let crawl = CrawlMessage::new(tag.clone(), state.search.platform.clone());
            match queue.enqueue(&crawl).await {
                Ok(message_id) => (
                    true,
                    Some(message_id),
                    format!("Crawl for #{} queued", tag),
                ),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to enqueue crawl job");
                    (
                        false,
                        None,
                        "Background crawl could not be queued".to_string(),
                    )
                }
            }
        }
        None => (false, None, "Background crawl queue is not configured".to_string()),
    };

    let report = state
        .ingest
        .ingest_tag(&tag, state.search.default_mode, state.search.inline_limit)
        .await;
    let new_images = state.gallery.present(report.records).await;

    Ok(Json(SearchResponse {
        search_term: tag,
        queued,
        message_id,
        message,
        outcome: report.outcome,
        new_images,
    }))
}
