//! Tagcrawl content processing
//!
//! Fetches remote media payloads and normalizes them to baseline JPEG.

pub mod error;
pub mod fetcher;
pub mod transcode;

pub use error::ProcessingError;
pub use fetcher::{ContentFetcher, HttpContentFetcher};
pub use transcode::ImageTranscoder;
