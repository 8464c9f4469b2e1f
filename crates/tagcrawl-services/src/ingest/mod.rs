//! Ingestion coordinator.
//!
//! Turns a hashtag query (or an account's own media listing) into the set of
//! records newly written by this invocation. Every descriptor runs the same
//! chain: existence check, fetch and transcode, content store write, metadata
//! insert. A failure anywhere in the chain drops that item only.

mod item;

use crate::metrics::{IngestMetrics, IngestStats};
use futures::stream::{self, StreamExt};
use item::ItemOutcome;
use serde::Serialize;
use std::sync::Arc;
use tagcrawl_core::{
    normalize_tag, Config, MediaDescriptor, MediaOrigin, MediaRecord, SearchMode,
};
use tagcrawl_db::MetadataStore;
use tagcrawl_processing::ContentFetcher;
use tagcrawl_source::{MediaSource, SourceError};
use tagcrawl_storage::Storage;

#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Namespace prefix for storage keys.
    pub storage_prefix: String,
    /// Platform label stamped on every record.
    pub platform: String,
    /// How many item chains may overlap within one invocation.
    pub item_concurrency: usize,
}

impl IngestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage_prefix: config.storage_prefix().to_string(),
            platform: config.platform_label().to_string(),
            item_concurrency: config.ingest_item_concurrency(),
        }
    }
}

/// How far an invocation got before producing its aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The query was empty after normalization; nothing was called.
    InvalidQuery,
    /// The source had no tag for the query, or the lookup failed.
    TagNotFound,
    /// Listing media failed.
    SourceUnavailable,
    /// The listing was processed (possibly yielding zero new records).
    Completed,
}

/// Result aggregate of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Normalized query term, or the owner id for own-media runs.
    pub query: String,
    pub tag_id: Option<String>,
    pub outcome: IngestOutcome,
    /// Records created by this invocation, in listing order.
    pub records: Vec<MediaRecord>,
    pub stats: IngestStats,
}

#[derive(Clone)]
pub struct IngestionCoordinator {
    source: Arc<dyn MediaSource>,
    fetcher: Arc<dyn ContentFetcher>,
    storage: Arc<dyn Storage>,
    metadata: Arc<dyn MetadataStore>,
    settings: IngestSettings,
    metrics: Arc<IngestMetrics>,
}

impl IngestionCoordinator {
    pub fn new(
        source: Arc<dyn MediaSource>,
        fetcher: Arc<dyn ContentFetcher>,
        storage: Arc<dyn Storage>,
        metadata: Arc<dyn MetadataStore>,
        settings: IngestSettings,
        metrics: Arc<IngestMetrics>,
    ) -> Self {
        Self {
            source,
            fetcher,
            storage,
            metadata,
            settings,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<IngestMetrics> {
        &self.metrics
    }

    /// Report for an invocation that stopped before any item ran.
    fn stopped_early(
        &self,
        query: String,
        tag_id: Option<String>,
        outcome: IngestOutcome,
    ) -> IngestReport {
        let stats = IngestStats::default();
        self.metrics.record(outcome, &stats);
        IngestReport {
            query,
            tag_id,
            outcome,
            records: Vec::new(),
            stats,
        }
    }

    /// Ingest up to `limit` media items for a hashtag query.
    ///
    /// Never fails: every error is absorbed into the report's outcome and stats.
    #[tracing::instrument(skip(self), fields(tag = tracing::field::Empty))]
    pub async fn ingest_tag(&self, query: &str, mode: SearchMode, limit: usize) -> IngestReport {
        let tag = normalize_tag(query);
        tracing::Span::current().record("tag", tag.as_str());

        if tag.is_empty() {
            tracing::info!("Empty query after normalization, nothing to ingest");
            return self.stopped_early(tag, None, IngestOutcome::InvalidQuery);
        }

        let tag_id = match self.source.resolve_tag_id(&tag).await {
            Ok(id) => id,
            Err(SourceError::InvalidInput(_)) => {
                return self.stopped_early(tag, None, IngestOutcome::InvalidQuery);
            }
            Err(e) => {
                tracing::info!(error = %e, "Hashtag not resolved");
                return self.stopped_early(tag, None, IngestOutcome::TagNotFound);
            }
        };

        let descriptors = match self.source.list_media(&tag_id, mode, limit).await {
            Ok(descriptors) => descriptors,
            Err(e) => {
                tracing::warn!(tag_id = %tag_id, error = %e, "Media listing unavailable");
                return self.stopped_early(tag, Some(tag_id), IngestOutcome::SourceUnavailable);
            }
        };

        let origin = MediaOrigin::Tag(tag.clone());
        let (records, stats) = self.run_items(&origin, descriptors).await;

        IngestReport {
            query: tag,
            tag_id: Some(tag_id),
            outcome: IngestOutcome::Completed,
            records,
            stats,
        }
    }

    /// Ingest the media published by `owner_id` itself.
    #[tracing::instrument(skip(self))]
    pub async fn ingest_owner_media(&self, owner_id: &str) -> IngestReport {
        let owner_id = owner_id.trim().to_string();
        if owner_id.is_empty() {
            return self.stopped_early(owner_id, None, IngestOutcome::InvalidQuery);
        }

        let descriptors = match self.source.list_owner_media(&owner_id).await {
            Ok(descriptors) => descriptors,
            Err(e) => {
                tracing::warn!(error = %e, "Owner media listing unavailable");
                return self.stopped_early(owner_id, None, IngestOutcome::SourceUnavailable);
            }
        };

        let origin = MediaOrigin::Owner(owner_id.clone());
        let (records, stats) = self.run_items(&origin, descriptors).await;

        IngestReport {
            query: owner_id,
            tag_id: None,
            outcome: IngestOutcome::Completed,
            records,
            stats,
        }
    }

    /// Run the per-item chain over a listing. Output order matches listing order
    /// regardless of how many chains overlap.
    async fn run_items(
        &self,
        origin: &MediaOrigin,
        descriptors: Vec<MediaDescriptor>,
    ) -> (Vec<MediaRecord>, IngestStats) {
        let start = std::time::Instant::now();
        let mut stats = IngestStats {
            listed: descriptors.len(),
            ..Default::default()
        };
        let concurrency = self.settings.item_concurrency.max(1);

        let results: Vec<(ItemOutcome, bool)> = stream::iter(descriptors)
            .map(|descriptor| self.process_item(origin, descriptor))
            .buffered(concurrency)
            .collect()
            .await;

        let mut records = Vec::new();
        for (outcome, existence_check_failed) in results {
            if existence_check_failed {
                stats.existence_check_failed += 1;
            }
            match outcome {
                ItemOutcome::Ingested(record) => {
                    stats.ingested += 1;
                    records.push(record);
                }
                ItemOutcome::AlreadyIndexed => stats.already_indexed += 1,
                ItemOutcome::SkippedNonImage => stats.skipped_non_image += 1,
                ItemOutcome::SkippedIncomplete => stats.skipped_incomplete += 1,
                ItemOutcome::FetchFailed => stats.fetch_failed += 1,
                ItemOutcome::StoreFailed => stats.store_failed += 1,
                ItemOutcome::Unindexed => stats.unindexed += 1,
                ItemOutcome::IndexConflict => stats.index_conflicts += 1,
            }
        }

        self.metrics.record(IngestOutcome::Completed, &stats);

        tracing::info!(
            origin = %origin.label(),
            listed = stats.listed,
            ingested = stats.ingested,
            already_indexed = stats.already_indexed,
            unindexed = stats.unindexed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Ingestion run finished"
        );

        (records, stats)
    }
}
