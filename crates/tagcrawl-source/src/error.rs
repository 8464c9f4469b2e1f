use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Remote returned status {status}: {body}")]
    Http { status: u16, body: String },

    /// The payload carried an `error` object.
    #[error("Remote API error (code {code:?}): {message}")]
    Api { code: Option<i64>, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<SourceError> for tagcrawl_core::AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidInput(msg) => tagcrawl_core::AppError::InvalidInput(msg),
            SourceError::NotFound(msg) => tagcrawl_core::AppError::NotFound(msg),
            other => tagcrawl_core::AppError::Upstream(other.to_string()),
        }
    }
}
