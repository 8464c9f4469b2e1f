//! Remote media source adapter.
//!
//! Resolves hashtags to opaque tag ids and lists media descriptors through a
//! Graph-style JSON API. All operations are pure reads.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GraphClient, GraphClientConfig};
pub use error::SourceError;

use async_trait::async_trait;
use tagcrawl_core::{MediaDescriptor, SearchMode};

/// Read-only access to a remote media catalogue.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Resolve a (raw) tag name to the source's tag id.
    ///
    /// The name is normalized first; an empty result fails with
    /// [`SourceError::InvalidInput`] before any network call. Every other
    /// failure collapses to [`SourceError::NotFound`].
    async fn resolve_tag_id(&self, tag_name: &str) -> Result<String, SourceError>;

    /// One page of media for a resolved tag. `limit` is a hint the remote may
    /// not honor exactly.
    async fn list_media(
        &self,
        tag_id: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<MediaDescriptor>, SourceError>;

    /// Media published by the given account.
    async fn list_owner_media(&self, owner_id: &str) -> Result<Vec<MediaDescriptor>, SourceError>;
}
