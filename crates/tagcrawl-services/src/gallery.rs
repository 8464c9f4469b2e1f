//! Read path over previously ingested records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tagcrawl_core::{normalize_tag, AppError, MediaRecord};
use tagcrawl_db::MetadataStore;
use tagcrawl_storage::Storage;

/// Placeholder URL handed out when signing fails.
const UNAVAILABLE_URL: &str = "#";

/// A record plus a time-limited URL for displaying it.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryImage {
    pub media_id: String,
    pub display_url: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error_generating_url: bool,
    pub permalink: String,
    pub caption: String,
    pub tag_source: String,
    pub storage_key: String,
    pub captured_at_utc: DateTime<Utc>,
    pub is_tag_result: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryPage {
    pub hashtag: String,
    pub image_count: usize,
    pub images: Vec<GalleryImage>,
}

#[derive(Clone)]
pub struct GalleryService {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn Storage>,
    platform: String,
    url_ttl: Duration,
}

impl GalleryService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn Storage>,
        platform: String,
        url_ttl: Duration,
    ) -> Self {
        Self {
            metadata,
            storage,
            platform,
            url_ttl,
        }
    }

    /// All records captured for a hashtag, newest first, with display URLs.
    pub async fn gallery(&self, raw_tag: &str) -> Result<GalleryPage, AppError> {
        let tag = normalize_tag(raw_tag);
        if tag.is_empty() {
            return Err(AppError::InvalidInput("Hashtag must not be empty".to_string()));
        }

        let records = self.metadata.list_by_tag(&tag, &self.platform).await?;
        let images = self.present(records).await;

        Ok(GalleryPage {
            hashtag: tag,
            image_count: images.len(),
            images,
        })
    }

    /// Attach display URLs to records. A signing failure degrades that entry only.
    pub async fn present(&self, records: Vec<MediaRecord>) -> Vec<GalleryImage> {
        let mut images = Vec::with_capacity(records.len());
        for record in records {
            let (display_url, error_generating_url) = match self
                .storage
                .presigned_url(&record.storage_key, self.url_ttl)
                .await
            {
                Ok(url) => (url, false),
                Err(e) => {
                    tracing::warn!(
                        media_id = %record.media_id,
                        storage_key = %record.storage_key,
                        error = %e,
                        "Failed to generate display URL"
                    );
                    (UNAVAILABLE_URL.to_string(), true)
                }
            };

            images.push(GalleryImage {
                media_id: record.media_id,
                display_url,
                error_generating_url,
                permalink: record.permalink,
                caption: record.caption,
                tag_source: record.tag_source,
                storage_key: record.storage_key,
                captured_at_utc: record.captured_at_utc,
                is_tag_result: record.is_tag_result,
            });
        }
        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{InMemoryMetadataStore, InMemoryStorage};
    use chrono::TimeZone;

    fn record(media_id: &str, tag: &str, platform: &str, hour: u32) -> MediaRecord {
        MediaRecord {
            media_id: media_id.to_string(),
            storage_key: format!("images/instagram/tag_{}_{}.jpg", tag, media_id),
            storage_container: "test-bucket".to_string(),
            tag_source: tag.to_string(),
            permalink: String::new(),
            caption: String::new(),
            original_source_url: String::new(),
            captured_at_utc: Utc.with_ymd_and_hms(2025, 5, 1, hour, 0, 0).unwrap(),
            platform: platform.to_string(),
            is_tag_result: true,
        }
    }

    async fn service(storage: Arc<InMemoryStorage>) -> GalleryService {
        let metadata = InMemoryMetadataStore::with_records(vec![
            record("old", "sunset", "instagram", 8),
            record("new", "sunset", "instagram", 12),
            record("other", "city", "instagram", 9),
            record("elsewhere", "sunset", "pixelfed", 10),
        ])
        .await;
        GalleryService::new(
            Arc::new(metadata),
            storage,
            "instagram".to_string(),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn test_gallery_filters_and_orders_newest_first() {
        let page = service(Arc::new(InMemoryStorage::default()))
            .await
            .gallery("#sunset")
            .await
            .unwrap();

        assert_eq!(page.hashtag, "sunset");
        assert_eq!(page.image_count, 2);
        assert_eq!(page.images[0].media_id, "new");
        assert_eq!(page.images[1].media_id, "old");
        assert!(page.images[0].display_url.contains("expires=3600"));
        assert!(!page.images[0].error_generating_url);

        let json = serde_json::to_value(&page.images[0]).unwrap();
        assert!(json.get("error_generating_url").is_none());
    }

    #[tokio::test]
    async fn test_signing_failure_degrades_to_placeholder() {
        let storage = Arc::new(InMemoryStorage::default());
        storage.fail_presign(true);

        let page = service(storage).await.gallery("sunset").await.unwrap();

        assert_eq!(page.image_count, 2);
        for image in &page.images {
            assert_eq!(image.display_url, "#");
            assert!(image.error_generating_url);
        }
        let json = serde_json::to_value(&page.images[0]).unwrap();
        assert_eq!(json["error_generating_url"], true);
    }

    #[tokio::test]
    async fn test_empty_hashtag_is_invalid_input() {
        let result = service(Arc::new(InMemoryStorage::default()))
            .await
            .gallery("  # ")
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
