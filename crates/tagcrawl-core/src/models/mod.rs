//! Domain models
//!
//! - `media`: descriptors returned by the remote media source, search modes and tag normalization
//! - `record`: persisted media records and their origin labels

pub mod media;
pub mod record;

pub use media::{normalize_tag, MediaDescriptor, MediaKind, SearchMode};
pub use record::{MediaOrigin, MediaRecord};
