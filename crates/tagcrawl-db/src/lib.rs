//! Tagcrawl database layer
//!
//! Repositories over PostgreSQL and the `MetadataStore` seam the ingestion
//! pipeline depends on.

pub mod db;

pub use db::{MediaRecordRepository, MetadataStore};
