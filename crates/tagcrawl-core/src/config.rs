//! Configuration module
//!
//! Environment driven configuration for the API server and the queue worker:
//! database, storage, Graph API credentials, ingestion limits and queue settings.

use std::env;
use std::str::FromStr;

use crate::constants::{DEFAULT_PLATFORM, DEFAULT_STORAGE_PREFIX};
use crate::models::SearchMode;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GRAPH_API_BASE_URL: &str = "https://graph.facebook.com/v22.0/";

/// Base configuration shared by both binaries
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Crawler configuration
#[derive(Clone, Debug)]
pub struct CrawlerConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub storage_prefix: String,
    // Graph API
    pub graph_api_base_url: String,
    pub graph_access_token: String,
    pub graph_business_account_id: String,
    pub platform_label: String,
    pub default_search_mode: SearchMode,
    // Ingestion
    pub inline_media_limit: usize,
    pub queue_media_limit: usize,
    pub tag_lookup_timeout_secs: u64,
    pub media_list_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub max_fetch_size_bytes: usize,
    pub jpeg_quality: u8,
    pub ingest_item_concurrency: usize,
    pub presigned_url_ttl_secs: u64,
    // Queue
    pub sqs_queue_url: Option<String>,
    pub sqs_region: Option<String>,
    pub queue_worker_enabled: bool,
    pub queue_wait_time_secs: i32,
    pub queue_max_messages: i32,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<CrawlerConfig>);

/// Read an env var and parse it, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Megabytes to bytes, saturating instead of wrapping on absurd inputs.
fn megabytes_to_bytes(megabytes: usize) -> usize {
    megabytes.saturating_mul(1024 * 1024)
}

impl Config {
    fn as_crawler(&self) -> &CrawlerConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_crawler().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = CrawlerConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_crawler().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_crawler().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_crawler().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_crawler().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_crawler().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_crawler().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_crawler().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_crawler().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_crawler().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_crawler().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_crawler().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_crawler().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_crawler().local_storage_base_url.as_deref()
    }

    pub fn storage_prefix(&self) -> &str {
        &self.as_crawler().storage_prefix
    }

    pub fn graph_api_base_url(&self) -> &str {
        &self.as_crawler().graph_api_base_url
    }

    pub fn graph_access_token(&self) -> &str {
        &self.as_crawler().graph_access_token
    }

    pub fn graph_business_account_id(&self) -> &str {
        &self.as_crawler().graph_business_account_id
    }

    pub fn platform_label(&self) -> &str {
        &self.as_crawler().platform_label
    }

    pub fn default_search_mode(&self) -> SearchMode {
        self.as_crawler().default_search_mode
    }

    pub fn inline_media_limit(&self) -> usize {
        self.as_crawler().inline_media_limit
    }

    pub fn queue_media_limit(&self) -> usize {
        self.as_crawler().queue_media_limit
    }

    pub fn tag_lookup_timeout_secs(&self) -> u64 {
        self.as_crawler().tag_lookup_timeout_secs
    }

    pub fn media_list_timeout_secs(&self) -> u64 {
        self.as_crawler().media_list_timeout_secs
    }

    pub fn fetch_timeout_secs(&self) -> u64 {
        self.as_crawler().fetch_timeout_secs
    }

    pub fn max_fetch_size_bytes(&self) -> usize {
        self.as_crawler().max_fetch_size_bytes
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.as_crawler().jpeg_quality
    }

    pub fn ingest_item_concurrency(&self) -> usize {
        self.as_crawler().ingest_item_concurrency
    }

    pub fn presigned_url_ttl_secs(&self) -> u64 {
        self.as_crawler().presigned_url_ttl_secs
    }

    pub fn sqs_queue_url(&self) -> Option<&str> {
        self.as_crawler().sqs_queue_url.as_deref()
    }

    pub fn sqs_region(&self) -> Option<&str> {
        self.as_crawler().sqs_region.as_deref()
    }

    pub fn queue_worker_enabled(&self) -> bool {
        self.as_crawler().queue_worker_enabled
    }

    pub fn queue_wait_time_secs(&self) -> i32 {
        self.as_crawler().queue_wait_time_secs
    }

    pub fn queue_max_messages(&self) -> i32 {
        self.as_crawler().queue_max_messages
    }
}

impl CrawlerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const INLINE_MEDIA_LIMIT: usize = 7;
        const QUEUE_MEDIA_LIMIT: usize = 25;
        const TAG_LOOKUP_TIMEOUT_SECS: u64 = 10;
        const MEDIA_LIST_TIMEOUT_SECS: u64 = 20;
        const FETCH_TIMEOUT_SECS: u64 = 10;
        const MAX_FETCH_SIZE_MB: usize = 25;
        const JPEG_QUALITY: u8 = 75;
        const PRESIGNED_URL_TTL_SECS: u64 = 3600;
        const QUEUE_WAIT_TIME_SECS: i32 = 20;
        const QUEUE_MAX_MESSAGES: i32 = 10;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let default_search_mode = match env::var("DEFAULT_SEARCH_MODE") {
            Ok(value) => value.parse::<SearchMode>()?,
            Err(_) => SearchMode::default(),
        };

        let config = CrawlerConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            storage_prefix: env::var("STORAGE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_STORAGE_PREFIX.to_string()),
            graph_api_base_url: env::var("GRAPH_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_API_BASE_URL.to_string()),
            graph_access_token: env::var("GRAPH_ACCESS_TOKEN")
                .map_err(|_| anyhow::anyhow!("GRAPH_ACCESS_TOKEN must be set"))?,
            graph_business_account_id: env::var("GRAPH_BUSINESS_ACCOUNT_ID")
                .map_err(|_| anyhow::anyhow!("GRAPH_BUSINESS_ACCOUNT_ID must be set"))?,
            platform_label: env::var("PLATFORM_LABEL")
                .unwrap_or_else(|_| DEFAULT_PLATFORM.to_string()),
            default_search_mode,
            inline_media_limit: env_or("INLINE_MEDIA_LIMIT", INLINE_MEDIA_LIMIT),
            queue_media_limit: env_or("QUEUE_MEDIA_LIMIT", QUEUE_MEDIA_LIMIT),
            tag_lookup_timeout_secs: env_or("TAG_LOOKUP_TIMEOUT_SECS", TAG_LOOKUP_TIMEOUT_SECS),
            media_list_timeout_secs: env_or("MEDIA_LIST_TIMEOUT_SECS", MEDIA_LIST_TIMEOUT_SECS),
            fetch_timeout_secs: env_or("FETCH_TIMEOUT_SECS", FETCH_TIMEOUT_SECS),
            max_fetch_size_bytes: megabytes_to_bytes(env_or(
                "MAX_FETCH_SIZE_MB",
                MAX_FETCH_SIZE_MB,
            )),
            jpeg_quality: env_or("JPEG_QUALITY", JPEG_QUALITY),
            ingest_item_concurrency: env_or("INGEST_ITEM_CONCURRENCY", 1usize),
            presigned_url_ttl_secs: env_or("PRESIGNED_URL_TTL_SECS", PRESIGNED_URL_TTL_SECS),
            sqs_queue_url: env::var("SQS_QUEUE_URL").ok().filter(|s| !s.trim().is_empty()),
            sqs_region: env::var("SQS_REGION").ok(),
            queue_worker_enabled: env_or("QUEUE_WORKER_ENABLED", true),
            queue_wait_time_secs: env_or("QUEUE_WAIT_TIME_SECS", QUEUE_WAIT_TIME_SECS),
            queue_max_messages: env_or("QUEUE_MAX_MESSAGES", QUEUE_MAX_MESSAGES),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.graph_access_token.trim().is_empty() {
            return Err(anyhow::anyhow!("GRAPH_ACCESS_TOKEN must not be empty"));
        }

        if self.graph_business_account_id.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "GRAPH_BUSINESS_ACCOUNT_ID must not be empty"
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(anyhow::anyhow!("JPEG_QUALITY must be between 1 and 100"));
        }

        if self.max_fetch_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FETCH_SIZE_MB must be at least 1"));
        }

        if self.ingest_item_concurrency == 0 {
            return Err(anyhow::anyhow!("INGEST_ITEM_CONCURRENCY must be at least 1"));
        }

        if !(1..=10).contains(&self.queue_max_messages) {
            return Err(anyhow::anyhow!("QUEUE_MAX_MESSAGES must be between 1 and 10"));
        }

        if !(0..=20).contains(&self.queue_wait_time_secs) {
            return Err(anyhow::anyhow!("QUEUE_WAIT_TIME_SECS must be between 0 and 20"));
        }

        // Validate storage backend configuration
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> CrawlerConfig {
        CrawlerConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
                environment: "development".to_string(),
            },
            database_url: "postgres://localhost/tagcrawl".to_string(),
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/tagcrawl".to_string()),
            local_storage_base_url: Some("http://localhost:5000/media".to_string()),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            graph_api_base_url: DEFAULT_GRAPH_API_BASE_URL.to_string(),
            graph_access_token: "token".to_string(),
            graph_business_account_id: "1784".to_string(),
            platform_label: DEFAULT_PLATFORM.to_string(),
            default_search_mode: SearchMode::Recent,
            inline_media_limit: 7,
            queue_media_limit: 25,
            tag_lookup_timeout_secs: 10,
            media_list_timeout_secs: 20,
            fetch_timeout_secs: 10,
            max_fetch_size_bytes: 25 * 1024 * 1024,
            jpeg_quality: 75,
            ingest_item_concurrency: 1,
            presigned_url_ttl_secs: 3600,
            sqs_queue_url: None,
            sqs_region: None,
            queue_worker_enabled: true,
            queue_wait_time_secs: 20,
            queue_max_messages: 10,
        }
    }

    #[test]
    fn test_valid_local_config() {
        assert!(local_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let mut config = local_config();
        config.database_url = "mysql://localhost/tagcrawl".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_requires_bucket_and_region() {
        let mut config = local_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("media".to_string());
        assert!(config.validate().is_err());

        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_quality_and_concurrency() {
        let mut config = local_config();
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = local_config();
        config.ingest_item_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_fetch_size() {
        let mut config = local_config();
        config.max_fetch_size_bytes = megabytes_to_bytes(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetch_size_saturates() {
        assert_eq!(megabytes_to_bytes(25), 25 * 1024 * 1024);
        assert_eq!(megabytes_to_bytes(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_is_production() {
        let mut config = local_config();
        config.base.environment = "Prod".to_string();
        assert!(Config(Box::new(config)).is_production());
    }
}
