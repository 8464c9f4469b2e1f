//! Tagcrawl Services Layer
//!
//! Hosts the ingestion coordinator and the gallery read path, and re-exports
//! the seams (source, fetcher, storage, metadata store) they are built from so
//! the API and worker depend on a single service facade.

pub mod gallery;
pub mod ingest;
pub mod metrics;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use gallery::{GalleryImage, GalleryPage, GalleryService};
pub use ingest::{IngestOutcome, IngestReport, IngestSettings, IngestionCoordinator};
pub use metrics::{IngestMetrics, IngestMetricsSnapshot, IngestStats};
pub use tagcrawl_db::{MediaRecordRepository, MetadataStore};
pub use tagcrawl_processing::{ContentFetcher, HttpContentFetcher, ProcessingError};
pub use tagcrawl_source::{GraphClient, GraphClientConfig, MediaSource, SourceError};
pub use tagcrawl_storage::{create_storage, Storage, StorageError};
