use serde::Serialize;

use crate::handler::CrawlJobHandler;
use crate::message::CrawlMessage;

/// Outcome of one received batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub new_records: usize,
    /// Indices of the bodies that were handled successfully.
    #[serde(skip)]
    pub succeeded: Vec<usize>,
    /// Indices of bodies that can never be handled (bad JSON, blank hashtag).
    #[serde(skip)]
    pub rejected: Vec<usize>,
}

impl BatchSummary {
    /// Indices whose messages should be removed from the queue: handled ones
    /// plus permanently malformed ones. Handler failures stay for redelivery.
    pub fn acknowledged(&self) -> impl Iterator<Item = usize> + '_ {
        self.succeeded.iter().chain(self.rejected.iter()).copied()
    }
}

/// Run every message body through the handler in order.
///
/// A failure on one message (bad JSON, blank hashtag, handler error) is
/// counted and logged; the rest of the batch still runs. Malformed bodies are
/// recorded as rejected so they are acknowledged instead of redelivered.
pub async fn process_batch<S: AsRef<str>>(
    handler: &dyn CrawlJobHandler,
    bodies: &[S],
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for (index, body) in bodies.iter().enumerate() {
        let message = match CrawlMessage::parse(body.as_ref()) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(index, error = %e, "Rejecting malformed crawl message");
                summary.failed += 1;
                summary.rejected.push(index);
                continue;
            }
        };

        match handler.handle(&message).await {
            Ok(new_records) => {
                tracing::info!(
                    hashtag = %message.hashtag,
                    platform = %message.platform,
                    new_records,
                    "Crawl job completed"
                );
                summary.processed += 1;
                summary.new_records += new_records;
                summary.succeeded.push(index);
            }
            Err(e) => {
                tracing::error!(
                    hashtag = %message.hashtag,
                    error = %e,
                    "Crawl job failed"
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
