//! Database repositories for data access layer
//
// Media record index (dedup authority)
pub mod media_record;

pub use media_record::{MediaRecordRepository, MetadataStore};
