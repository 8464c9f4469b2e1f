use thiserror::Error;

/// Failures of the fetch and transcode step. Each one drops a single item.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Transport failure or non-2xx response.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Payload of {size} bytes exceeds limit of {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// Payload could not be decoded as an image or re-encoded as JPEG.
    #[error("Decode failed: {0}")]
    Decode(String),
}

impl ProcessingError {
    /// Only transport failures are worth retrying by a caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProcessingError::Fetch(_))
    }
}

impl From<ProcessingError> for tagcrawl_core::AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Fetch(msg) => tagcrawl_core::AppError::Upstream(msg),
            other => tagcrawl_core::AppError::ImageProcessing(other.to_string()),
        }
    }
}
