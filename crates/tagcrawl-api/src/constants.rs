/// Prefix for every JSON endpoint except health.
pub const API_PREFIX: &str = "/api";

/// Maximum in-flight HTTP requests. Each inline search holds outbound
/// connections for the whole ingestion run.
pub const HTTP_CONCURRENCY_LIMIT: usize = 64;

/// Request bodies are tiny JSON documents.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "tagcrawl=debug,tower_http=debug";
