//! Queue job handlers backed by API services.

mod crawl;

pub use crawl::CrawlTaskHandler;
