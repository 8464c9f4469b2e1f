use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tagcrawl_core::SearchMode;
use tagcrawl_services::{IngestOutcome, IngestionCoordinator};
use tagcrawl_worker::{CrawlJobHandler, CrawlMessage};

/// Runs queued crawl jobs through the ingestion coordinator.
pub struct CrawlTaskHandler {
    coordinator: IngestionCoordinator,
    platform: String,
    mode: SearchMode,
    limit: usize,
}

impl CrawlTaskHandler {
    pub fn new(
        coordinator: IngestionCoordinator,
        platform: String,
        mode: SearchMode,
        limit: usize,
    ) -> Self {
        Self {
            coordinator,
            platform,
            mode,
            limit,
        }
    }
}

#[async_trait]
impl CrawlJobHandler for CrawlTaskHandler {
    #[tracing::instrument(skip(self, message), fields(hashtag = %message.hashtag))]
    async fn handle(&self, message: &CrawlMessage) -> Result<usize> {
        if !message.platform.eq_ignore_ascii_case(&self.platform) {
            tracing::warn!(
                platform = %message.platform,
                expected = %self.platform,
                "Ignoring crawl job for unsupported platform"
            );
            return Ok(0);
        }

        let report = self
            .coordinator
            .ingest_tag(&message.hashtag, self.mode, self.limit)
            .await;

        match report.outcome {
            // Leave the message on the queue so it is retried after the visibility timeout.
            IngestOutcome::SourceUnavailable => Err(anyhow!(
                "Media source unavailable while crawling #{}",
                report.query
            )),
            _ => {
                tracing::info!(
                    outcome = ?report.outcome,
                    listed = report.stats.listed,
                    ingested = report.stats.ingested,
                    already_indexed = report.stats.already_indexed,
                    "Queued crawl finished"
                );
                Ok(report.records.len())
            }
        }
    }
}
