//! Tagcrawl API Library
//!
//! HTTP handlers, queue job handlers and application setup.

pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod task_handlers;
mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, SearchSettings};
pub use task_handlers::CrawlTaskHandler;
