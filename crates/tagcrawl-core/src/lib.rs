//! Tagcrawl Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by every tagcrawl component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, CrawlerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    normalize_tag, MediaDescriptor, MediaKind, MediaOrigin, MediaRecord, SearchMode,
};
pub use storage_types::StorageBackend;
