//! Long-polling queue consumer
//!
//! Receives batches from a [`QueueReceiver`], runs them through
//! [`process_batch`] and deletes the messages that were handled or can never
//! be handled. Handler failures are left on the queue for redelivery.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::batch::process_batch;
use crate::handler::CrawlJobHandler;
use crate::sqs::QueueReceiver;

#[derive(Debug, Clone)]
pub struct QueueConsumerConfig {
    pub max_messages: i32,
    pub wait_time_secs: i32,
    /// Pause after a failed receive before polling again.
    pub error_backoff: Duration,
}

impl Default for QueueConsumerConfig {
    fn default() -> Self {
        Self {
            max_messages: 10,
            wait_time_secs: 20,
            error_backoff: Duration::from_secs(5),
        }
    }
}

pub struct QueueConsumer {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl QueueConsumer {
    /// Spawn the polling loop on the current runtime.
    pub fn spawn(
        receiver: Arc<dyn QueueReceiver>,
        handler: Arc<dyn CrawlJobHandler>,
        config: QueueConsumerConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(poll_loop(receiver, handler, config, shutdown_rx));
        Self { shutdown_tx, handle }
    }

    /// Signal the loop to stop and wait for the in-flight batch to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Queue consumer task panicked");
        }
    }
}

async fn poll_loop(
    receiver: Arc<dyn QueueReceiver>,
    handler: Arc<dyn CrawlJobHandler>,
    config: QueueConsumerConfig,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    tracing::info!(
        max_messages = config.max_messages,
        wait_time_secs = config.wait_time_secs,
        "Crawl queue consumer started"
    );

    loop {
        let received = tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Crawl queue consumer shutting down");
                break;
            }
            received = receiver.receive(config.max_messages, config.wait_time_secs) => received,
        };

        let messages = match received {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(error = %e, "Failed to receive crawl messages");
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(config.error_backoff) => continue,
                }
            }
        };

        if messages.is_empty() {
            continue;
        }

        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        let summary = process_batch(handler.as_ref(), &bodies).await;

        for index in summary.acknowledged() {
            let receipt_handle = &messages[index].receipt_handle;
            if let Err(e) = receiver.delete(receipt_handle).await {
                tracing::warn!(error = %e, "Failed to delete processed crawl message");
            }
        }

        tracing::info!(
            received = messages.len(),
            processed = summary.processed,
            failed = summary.failed,
            rejected = summary.rejected.len(),
            new_records = summary.new_records,
            "Crawl batch finished"
        );
    }

    tracing::info!("Crawl queue consumer stopped");
}
