//! Tagcrawl Storage Library
//!
//! Content store abstraction with S3 and local filesystem backends.
//!
//! # Storage key format
//!
//! Every object written by the ingestion pipeline lives at
//! `{prefix}/{origin}_{media_id}.jpg`, where `prefix` is the configured namespace
//! with surrounding `/` trimmed and `origin` is `tag_{tag}` or `user_{owner_id}`.
//! Key generation is centralized in the `keys` module so every caller agrees.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::build_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use tagcrawl_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
