//! Service initialization and application state setup

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tagcrawl_core::Config;
use tagcrawl_services::{
    GalleryService, GraphClient, GraphClientConfig, HttpContentFetcher, IngestMetrics,
    IngestSettings, IngestionCoordinator, MediaRecordRepository, Storage,
};
use tagcrawl_worker::{JobQueue, QueueConsumer, QueueConsumerConfig, SqsJobQueue};

use crate::state::{AppState, SearchSettings};
use crate::task_handlers::CrawlTaskHandler;

/// Wired services; `sqs` is kept so the consumer can share the producer's client.
pub struct Services {
    pub state: Arc<AppState>,
    sqs: Option<Arc<SqsJobQueue>>,
}

/// Build every client once and wire them into the application state.
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Services> {
    let source = GraphClient::new(GraphClientConfig::from_config(config))
        .context("Failed to build Graph API client")?;
    let fetcher = HttpContentFetcher::new(
        Duration::from_secs(config.fetch_timeout_secs()),
        config.max_fetch_size_bytes(),
        config.jpeg_quality(),
    )
    .context("Failed to build content fetcher")?;
    let metadata = Arc::new(MediaRecordRepository::new(pool));

    let coordinator = IngestionCoordinator::new(
        Arc::new(source),
        Arc::new(fetcher),
        storage.clone(),
        metadata.clone(),
        IngestSettings::from_config(config),
        Arc::new(IngestMetrics::new()),
    );

    let gallery = GalleryService::new(
        metadata,
        storage.clone(),
        config.platform_label().to_string(),
        Duration::from_secs(config.presigned_url_ttl_secs()),
    );

    let sqs = match config.sqs_queue_url() {
        Some(queue_url) => {
            let region = config.sqs_region().map(String::from);
            let queue = SqsJobQueue::from_env(queue_url, region).await;
            tracing::info!(queue_url = %queue.queue_url(), "Crawl job queue configured");
            Some(Arc::new(queue))
        }
        None => {
            tracing::info!("SQS_QUEUE_URL not set, searches run inline only");
            None
        }
    };

    let state = Arc::new(AppState {
        ingest: coordinator,
        gallery,
        storage,
        job_queue: sqs.clone().map(|queue| queue as Arc<dyn JobQueue>),
        search: SearchSettings {
            inline_limit: config.inline_media_limit(),
            default_mode: config.default_search_mode(),
            platform: config.platform_label().to_string(),
        },
        owner_account_id: config.graph_business_account_id().to_string(),
        environment: config.environment().to_string(),
    });

    Ok(Services { state, sqs })
}

/// Start the in-process queue consumer if a queue is configured and enabled.
pub fn start_queue_consumer(config: &Config, services: &Services) -> Option<QueueConsumer> {
    let queue = services.sqs.clone()?;
    if !config.queue_worker_enabled() {
        tracing::info!("QUEUE_WORKER_ENABLED=false, not consuming crawl jobs in this process");
        return None;
    }

    let handler = CrawlTaskHandler::new(
        services.state.ingest.clone(),
        config.platform_label().to_string(),
        config.default_search_mode(),
        config.queue_media_limit(),
    );
    let consumer_config = QueueConsumerConfig {
        max_messages: config.queue_max_messages(),
        wait_time_secs: config.queue_wait_time_secs(),
        ..QueueConsumerConfig::default()
    };

    Some(QueueConsumer::spawn(queue, Arc::new(handler), consumer_config))
}
