use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tagcrawl_services::IngestMetricsSnapshot;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub environment: String,
    pub storage: String,
    pub queue: String,
    pub ingest: IngestMetricsSnapshot,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    // Probe with a key that never exists; only connectivity matters.
    let storage = match tokio::time::timeout(
        TIMEOUT,
        state.storage.exists("health-check-non-existent-key"),
    )
    .await
    {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Storage health check warning");
            format!("degraded: {}", e)
        }
        Err(_) => {
            tracing::warn!("Storage health check timed out");
            "timeout".to_string()
        }
    };

    let queue = if state.job_queue.is_some() {
        "configured"
    } else {
        "disabled"
    };

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        environment: state.environment.clone(),
        storage,
        queue: queue.to_string(),
        ingest: state.ingest.metrics().snapshot(),
    };

    (StatusCode::OK, Json(response))
}
