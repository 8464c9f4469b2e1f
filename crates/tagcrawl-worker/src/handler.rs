//! Crawl job handler trait
//!
//! The API implements this trait over its ingestion coordinator. The worker
//! calls `handle` once per valid message.

use anyhow::Result;
use async_trait::async_trait;

use crate::message::CrawlMessage;

#[async_trait]
pub trait CrawlJobHandler: Send + Sync {
    /// Process one crawl job and return the number of new records it produced.
    async fn handle(&self, message: &CrawlMessage) -> Result<usize>;
}
