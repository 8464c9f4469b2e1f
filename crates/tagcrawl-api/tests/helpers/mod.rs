//! Test helpers: build AppState and router over in-memory pipeline seams.
//!
//! Run with: `cargo test -p tagcrawl-api --test api_test`

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tagcrawl_api::setup::routes;
use tagcrawl_api::state::{AppState, SearchSettings};
use tagcrawl_core::SearchMode;
use tagcrawl_services::test_helpers::{
    InMemoryMetadataStore, MockContentFetcher, MockMediaSource, TestPipeline,
};
use tagcrawl_services::GalleryService;
use tagcrawl_worker::{CrawlMessage, JobQueue};
use tokio::sync::Mutex;

pub const OWNER_ACCOUNT_ID: &str = "17841400000000000";
pub const INLINE_LIMIT: usize = 7;

/// Job queue that records every enqueued message.
#[derive(Default)]
pub struct RecordingQueue {
    pub messages: Mutex<Vec<CrawlMessage>>,
    fail: AtomicBool,
}

impl RecordingQueue {
    pub fn failing() -> Self {
        let queue = Self::default();
        queue.fail.store(true, Ordering::SeqCst);
        queue
    }
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, message: &CrawlMessage) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("queue unreachable"));
        }
        let mut messages = self.messages.lock().await;
        messages.push(message.clone());
        Ok(format!("msg-{}", messages.len()))
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub pipeline: TestPipeline,
}

/// Build a test server around a pipeline made of the given source and metadata store.
pub fn setup_test_app(
    source: MockMediaSource,
    metadata: InMemoryMetadataStore,
    queue: Option<Arc<RecordingQueue>>,
) -> TestApp {
    let pipeline = TestPipeline::new(source, MockContentFetcher::new(), metadata, 1);

    let gallery = GalleryService::new(
        pipeline.metadata.clone(),
        pipeline.storage.clone(),
        "instagram".to_string(),
        Duration::from_secs(3600),
    );

    let state = Arc::new(AppState {
        ingest: pipeline.coordinator.clone(),
        gallery,
        storage: pipeline.storage.clone(),
        job_queue: queue.map(|q| q as Arc<dyn JobQueue>),
        search: SearchSettings {
            inline_limit: INLINE_LIMIT,
            default_mode: SearchMode::Recent,
            platform: "instagram".to_string(),
        },
        owner_account_id: OWNER_ACCOUNT_ID.to_string(),
        environment: "test".to_string(),
    });

    let server =
        TestServer::new(routes::api_routes(state)).expect("Failed to create test server");

    TestApp { server, pipeline }
}
