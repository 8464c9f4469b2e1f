//! Crawl job queue and worker.
//!
//! The web surface enqueues a [`CrawlMessage`] per search through a
//! [`JobQueue`]; a [`QueueConsumer`] long-polls the queue and hands each batch
//! to a [`CrawlJobHandler`] implemented by the API's ingestion service.

pub mod batch;
pub mod consumer;
pub mod handler;
pub mod message;
pub mod sqs;

pub use batch::{process_batch, BatchSummary};
pub use consumer::{QueueConsumer, QueueConsumerConfig};
pub use handler::CrawlJobHandler;
pub use message::CrawlMessage;
pub use sqs::{JobQueue, QueueReceiver, ReceivedMessage, SqsJobQueue};
