//! SQS-backed crawl job queue

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::Client;

use crate::message::CrawlMessage;

/// Producer side of the crawl queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue one crawl job and return the queue's message id.
    async fn enqueue(&self, message: &CrawlMessage) -> Result<String>;
}

/// One message as received from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub body: String,
    pub receipt_handle: String,
}

/// Consumer side of the crawl queue.
#[async_trait]
pub trait QueueReceiver: Send + Sync {
    async fn receive(&self, max_messages: i32, wait_time_secs: i32)
        -> Result<Vec<ReceivedMessage>>;

    async fn delete(&self, receipt_handle: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqsJobQueue {
    client: Client,
    queue_url: String,
}

impl SqsJobQueue {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Build a client from the default AWS credential chain.
    pub async fn from_env(queue_url: impl Into<String>, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), queue_url)
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl JobQueue for SqsJobQueue {
    #[tracing::instrument(skip(self, message), fields(hashtag = %message.hashtag))]
    async fn enqueue(&self, message: &CrawlMessage) -> Result<String> {
        let body = message.to_body()?;
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .context("Failed to send crawl message to SQS")?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        tracing::debug!(message_id = %message_id, "Crawl job enqueued");
        Ok(message_id)
    }
}

#[async_trait]
impl QueueReceiver for SqsJobQueue {
    async fn receive(
        &self,
        max_messages: i32,
        wait_time_secs: i32,
    ) -> Result<Vec<ReceivedMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_time_secs)
            .send()
            .await
            .context("Failed to receive messages from SQS")?;

        let mut received = Vec::new();
        for message in output.messages() {
            let Some(receipt_handle) = message.receipt_handle() else {
                tracing::warn!(
                    message_id = ?message.message_id(),
                    "Received SQS message without a receipt handle"
                );
                continue;
            };
            received.push(ReceivedMessage {
                body: message.body().unwrap_or_default().to_string(),
                receipt_handle: receipt_handle.to_string(),
            });
        }
        Ok(received)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to delete SQS message: {}", e))?;
        Ok(())
    }
}
