use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tagcrawl_core::{AppError, MediaRecord};

/// Keyed lookup store for ingested media.
///
/// `media_id` is the primary key and the only serialization point between
/// concurrent ingestions: a second insert for the same id fails with
/// [`AppError::Conflict`] and never overwrites.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Whether a record with this media id is already indexed.
    async fn exists(&self, media_id: &str) -> Result<bool, AppError>;

    /// Plain keyed insert. Duplicates are reported as `AppError::Conflict`.
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError>;

    /// Records for a tag source and platform, newest first.
    async fn list_by_tag(&self, tag_source: &str, platform: &str)
        -> Result<Vec<MediaRecord>, AppError>;
}

/// Repository for the `crawled_media` table
#[derive(Clone)]
pub struct MediaRecordRepository {
    pool: PgPool,
}

impl MediaRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl MetadataStore for MediaRecordRepository {
    #[tracing::instrument(skip(self), fields(db.table = "crawled_media", db.operation = "select"))]
    async fn exists(&self, media_id: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM crawled_media WHERE media_id = $1)",
        )
        .bind(media_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "crawled_media", db.operation = "insert", db.record_id = %record.media_id)
    )]
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO crawled_media (
                media_id, storage_key, storage_container, tag_source, permalink,
                caption, original_source_url, captured_at_utc, platform, is_tag_result
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&record.media_id)
        .bind(&record.storage_key)
        .bind(&record.storage_container)
        .bind(&record.tag_source)
        .bind(&record.permalink)
        .bind(&record.caption)
        .bind(&record.original_source_url)
        .bind(record.captured_at_utc)
        .bind(&record.platform)
        .bind(record.is_tag_result)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "media_id {} is already indexed",
                record.media_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "crawled_media", db.operation = "select"))]
    async fn list_by_tag(
        &self,
        tag_source: &str,
        platform: &str,
    ) -> Result<Vec<MediaRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, MediaRecord>(
            r#"
            SELECT media_id, storage_key, storage_container, tag_source, permalink,
                   caption, original_source_url, captured_at_utc, platform, is_tag_result
            FROM crawled_media
            WHERE tag_source = $1 AND platform = $2
            ORDER BY captured_at_utc DESC, media_id ASC
            "#,
        )
        .bind(tag_source)
        .bind(platform)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
