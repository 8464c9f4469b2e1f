//! Per-item chain: check, fetch, store, index.

use super::IngestionCoordinator;
use chrono::Utc;
use tagcrawl_core::constants::CANONICAL_CONTENT_TYPE;
use tagcrawl_core::{MediaDescriptor, MediaOrigin, MediaRecord};
use tagcrawl_storage::build_storage_key;

/// Terminal state of one descriptor.
#[derive(Debug)]
pub(super) enum ItemOutcome {
    Ingested(MediaRecord),
    AlreadyIndexed,
    SkippedNonImage,
    SkippedIncomplete,
    FetchFailed,
    StoreFailed,
    Unindexed,
    IndexConflict,
}

impl IngestionCoordinator {
    /// Returns the outcome and whether the existence check failed open.
    #[tracing::instrument(skip(self, origin, descriptor), fields(media_id = %descriptor.id))]
    pub(super) async fn process_item(
        &self,
        origin: &MediaOrigin,
        descriptor: MediaDescriptor,
    ) -> (ItemOutcome, bool) {
        if !descriptor.kind.is_image() {
            tracing::debug!(kind = %descriptor.kind, "Unhandled media kind, skipping");
            return (ItemOutcome::SkippedNonImage, false);
        }

        let media_id = descriptor.id.trim();
        let source_url = match descriptor.usable_source_url() {
            Some(url) if !media_id.is_empty() => url,
            _ => {
                tracing::debug!("Descriptor without id or source URL, skipping");
                return (ItemOutcome::SkippedIncomplete, false);
            }
        };

        // An uncertain check proceeds; the primary key still prevents double indexing.
        let mut existence_check_failed = false;
        match self.metadata.exists(media_id).await {
            Ok(true) => {
                tracing::debug!("Already indexed, skipping");
                return (ItemOutcome::AlreadyIndexed, false);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Existence check failed, proceeding");
                existence_check_failed = true;
            }
        }

        let jpeg = match self.fetcher.fetch_and_transcode(source_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    source_url = %source_url,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Fetch or transcode failed, skipping"
                );
                return (ItemOutcome::FetchFailed, existence_check_failed);
            }
        };

        let storage_key = build_storage_key(&self.settings.storage_prefix, origin, media_id);
        if let Err(e) = self
            .storage
            .put(&storage_key, jpeg, CANONICAL_CONTENT_TYPE)
            .await
        {
            tracing::warn!(storage_key = %storage_key, error = %e, "Content store write failed, skipping");
            return (ItemOutcome::StoreFailed, existence_check_failed);
        }

        let record = MediaRecord {
            media_id: media_id.to_string(),
            storage_key,
            storage_container: self.storage.container().to_string(),
            tag_source: origin.tag_source().to_string(),
            permalink: descriptor.permalink.clone(),
            caption: descriptor.caption.clone(),
            original_source_url: source_url.to_string(),
            captured_at_utc: Utc::now(),
            platform: self.settings.platform.clone(),
            is_tag_result: origin.is_tag_result(),
        };

        match self.metadata.insert(&record).await {
            Ok(()) => {
                tracing::info!(storage_key = %record.storage_key, "Media ingested");
                (ItemOutcome::Ingested(record), existence_check_failed)
            }
            Err(e) if e.is_conflict() => {
                tracing::info!("Indexed concurrently by another run");
                (ItemOutcome::IndexConflict, existence_check_failed)
            }
            Err(e) => {
                tracing::error!(
                    storage_key = %record.storage_key,
                    storage_container = %record.storage_container,
                    error = %e,
                    "Stored but unindexed: content written without metadata record"
                );
                (ItemOutcome::Unindexed, existence_check_failed)
            }
        }
    }
}
