//! In-memory implementations of the pipeline seams.
//!
//! Each mock records the calls it receives and supports failure injection, so
//! coordinator and router tests can assert on side effects.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tagcrawl_core::{AppError, MediaDescriptor, MediaKind, MediaRecord, SearchMode, StorageBackend};
use tagcrawl_db::MetadataStore;
use tagcrawl_processing::{ContentFetcher, ProcessingError};
use tagcrawl_source::{MediaSource, SourceError};
use tagcrawl_storage::{Storage, StorageError, StorageResult};
use tokio::sync::Mutex;

/// Minimal bytes standing in for a transcoded image.
pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// Convenience constructor for an image descriptor with a source URL.
pub fn image(id: &str, url: &str) -> MediaDescriptor {
    MediaDescriptor {
        id: id.to_string(),
        kind: MediaKind::Image,
        source_url: Some(url.to_string()),
        caption: format!("caption {}", id),
        permalink: format!("https://example.com/p/{}", id),
        timestamp: None,
    }
}

/// Descriptor of a non-image kind.
pub fn media_of_kind(id: &str, kind: MediaKind) -> MediaDescriptor {
    MediaDescriptor {
        kind,
        ..image(id, &format!("https://cdn.example.com/{}.mp4", id))
    }
}

#[derive(Default)]
pub struct MockMediaSource {
    tags: Mutex<HashMap<String, String>>,
    media: Mutex<HashMap<String, Vec<MediaDescriptor>>>,
    owner_media: Mutex<HashMap<String, Vec<MediaDescriptor>>>,
    fail_listing: AtomicBool,
    pub resolve_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    last_list: Mutex<Option<(String, SearchMode, usize)>>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_tag(self, tag: &str, tag_id: &str, media: Vec<MediaDescriptor>) -> Self {
        self.tags
            .lock()
            .await
            .insert(tag.to_string(), tag_id.to_string());
        self.media.lock().await.insert(tag_id.to_string(), media);
        self
    }

    pub async fn with_owner_media(self, owner_id: &str, media: Vec<MediaDescriptor>) -> Self {
        self.owner_media
            .lock()
            .await
            .insert(owner_id.to_string(), media);
        self
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Arguments of the most recent `list_media` call.
    pub async fn last_list(&self) -> Option<(String, SearchMode, usize)> {
        self.last_list.lock().await.clone()
    }

    pub fn total_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst) + self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn resolve_tag_id(&self, tag_name: &str) -> Result<String, SourceError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let tag = tagcrawl_core::normalize_tag(tag_name);
        if tag.is_empty() {
            return Err(SourceError::InvalidInput("empty tag".to_string()));
        }
        self.tags
            .lock()
            .await
            .get(&tag)
            .cloned()
            .ok_or(SourceError::NotFound(tag))
    }

    async fn list_media(
        &self,
        tag_id: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<MediaDescriptor>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_list.lock().await = Some((tag_id.to_string(), mode, limit));
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("listing timed out".to_string()));
        }
        Ok(self
            .media
            .lock()
            .await
            .get(tag_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_owner_media(&self, owner_id: &str) -> Result<Vec<MediaDescriptor>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("listing timed out".to_string()));
        }
        Ok(self
            .owner_media
            .lock()
            .await
            .get(owner_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Fetcher returning [`FAKE_JPEG`] for every URL except the configured failures.
#[derive(Default)]
pub struct MockContentFetcher {
    failing_urls: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch, to let concurrent runs interleave.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn fail_url(&self, url: &str) {
        self.failing_urls.lock().await.insert(url.to_string());
    }

    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn fetch_and_transcode(&self, source_url: &str) -> Result<Vec<u8>, ProcessingError> {
        self.fetched.lock().await.push(source_url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_urls.lock().await.contains(source_url) {
            return Err(ProcessingError::Fetch(format!("GET {} failed", source_url)));
        }
        Ok(FAKE_JPEG.to_vec())
    }
}

/// Object map keyed by storage key.
pub struct InMemoryStorage {
    container: String,
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    failing_keys: Mutex<HashSet<String>>,
    fail_presign: AtomicBool,
    pub put_calls: AtomicUsize,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new("test-bucket")
    }
}

impl InMemoryStorage {
    pub fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            objects: Mutex::new(HashMap::new()),
            failing_keys: Mutex::new(HashSet::new()),
            fail_presign: AtomicBool::new(false),
            put_calls: AtomicUsize::new(0),
        }
    }

    pub async fn fail_key(&self, key: &str) {
        self.failing_keys.lock().await.insert(key.to_string());
    }

    pub fn fail_presign(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::SeqCst);
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.lock().await.contains(storage_key) {
            return Err(StorageError::UploadFailed(format!("put {} failed", storage_key)));
        }
        self.objects
            .lock()
            .await
            .insert(storage_key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().await.remove(storage_key);
        Ok(())
    }

    async fn presigned_url(&self, storage_key: &str, expires_in: Duration) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("signing unavailable".to_string()));
        }
        Ok(format!(
            "https://{}.example.com/{}?expires={}",
            self.container,
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().await.contains_key(storage_key))
    }

    fn container(&self) -> &str {
        &self.container
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Metadata store with primary key semantics and injectable failures.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    records: Mutex<Vec<MediaRecord>>,
    fail_exists: AtomicBool,
    failing_inserts: Mutex<HashSet<String>>,
    /// Pretend the existence check never sees concurrent inserts.
    blind_exists: AtomicBool,
    pub exists_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_records(records: Vec<MediaRecord>) -> Self {
        let store = Self::default();
        *store.records.lock().await = records;
        store
    }

    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    pub fn blind_exists(&self, blind: bool) {
        self.blind_exists.store(blind, Ordering::SeqCst);
    }

    pub async fn fail_insert(&self, media_id: &str) {
        self.failing_inserts.lock().await.insert(media_id.to_string());
    }

    pub async fn records(&self) -> Vec<MediaRecord> {
        self.records.lock().await.clone()
    }

    pub async fn media_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .lock()
            .await
            .iter()
            .map(|r| r.media_id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn exists(&self, media_id: &str) -> Result<bool, AppError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(AppError::Internal("metadata store unreachable".to_string()));
        }
        if self.blind_exists.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .any(|r| r.media_id == media_id))
    }

    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_inserts.lock().await.contains(&record.media_id) {
            return Err(AppError::Internal("insert rejected".to_string()));
        }
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.media_id == record.media_id) {
            return Err(AppError::Conflict(format!(
                "media_id {} is already indexed",
                record.media_id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_by_tag(&self, tag_source: &str, platform: &str) -> Result<Vec<MediaRecord>, AppError> {
        let mut records: Vec<MediaRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.tag_source == tag_source && r.platform == platform)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.captured_at_utc
                .cmp(&a.captured_at_utc)
                .then_with(|| a.media_id.cmp(&b.media_id))
        });
        Ok(records)
    }
}

/// All four mocks, shared, plus a coordinator wired to them.
pub struct TestPipeline {
    pub source: Arc<MockMediaSource>,
    pub fetcher: Arc<MockContentFetcher>,
    pub storage: Arc<InMemoryStorage>,
    pub metadata: Arc<InMemoryMetadataStore>,
    pub coordinator: crate::IngestionCoordinator,
}

impl TestPipeline {
    pub fn new(
        source: MockMediaSource,
        fetcher: MockContentFetcher,
        metadata: InMemoryMetadataStore,
        item_concurrency: usize,
    ) -> Self {
        let source = Arc::new(source);
        let fetcher = Arc::new(fetcher);
        let storage = Arc::new(InMemoryStorage::default());
        let metadata = Arc::new(metadata);
        let coordinator = crate::IngestionCoordinator::new(
            source.clone(),
            fetcher.clone(),
            storage.clone(),
            metadata.clone(),
            crate::IngestSettings {
                storage_prefix: tagcrawl_core::constants::DEFAULT_STORAGE_PREFIX.to_string(),
                platform: tagcrawl_core::constants::DEFAULT_PLATFORM.to_string(),
                item_concurrency,
            },
            Arc::new(crate::IngestMetrics::new()),
        );

        Self {
            source,
            fetcher,
            storage,
            metadata,
            coordinator,
        }
    }
}
