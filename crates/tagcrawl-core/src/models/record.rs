use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::constants::OWN_MEDIA_TAG_SOURCE;

/// Where a media item was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOrigin {
    /// Tag search for the given normalized tag name.
    Tag(String),
    /// Own-media listing of the given account id.
    Owner(String),
}

impl MediaOrigin {
    /// Origin label used inside storage keys: `tag_<name>` or `user_<id>`.
    pub fn label(&self) -> String {
        match self {
            MediaOrigin::Tag(tag) => format!("tag_{}", tag),
            MediaOrigin::Owner(owner_id) => format!("user_{}", owner_id),
        }
    }

    /// Value stored in `MediaRecord::tag_source`.
    pub fn tag_source(&self) -> &str {
        match self {
            MediaOrigin::Tag(tag) => tag,
            MediaOrigin::Owner(_) => OWN_MEDIA_TAG_SOURCE,
        }
    }

    pub fn is_tag_result(&self) -> bool {
        matches!(self, MediaOrigin::Tag(_))
    }
}

/// Persisted, indexed representation of one ingested media item.
///
/// `media_id` is the primary key. Records are append-only: the pipeline never
/// updates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaRecord {
    pub media_id: String,
    pub storage_key: String,
    pub storage_container: String,
    pub tag_source: String,
    pub permalink: String,
    pub caption: String,
    pub original_source_url: String,
    pub captured_at_utc: DateTime<Utc>,
    pub platform: String,
    pub is_tag_result: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_origin_labels() {
        let tag = MediaOrigin::Tag("sunset".to_string());
        assert_eq!(tag.label(), "tag_sunset");
        assert_eq!(tag.tag_source(), "sunset");
        assert!(tag.is_tag_result());

        let owner = MediaOrigin::Owner("1784".to_string());
        assert_eq!(owner.label(), "user_1784");
        assert_eq!(owner.tag_source(), OWN_MEDIA_TAG_SOURCE);
        assert!(!owner.is_tag_result());
    }

    #[test]
    fn test_record_serializes_utc_timestamp() {
        let record = MediaRecord {
            media_id: "A".to_string(),
            storage_key: "images/instagram/tag_sunset_A.jpg".to_string(),
            storage_container: "bucket".to_string(),
            tag_source: "sunset".to_string(),
            permalink: String::new(),
            caption: String::new(),
            original_source_url: "https://cdn.example.com/a.jpg".to_string(),
            captured_at_utc: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            platform: "instagram".to_string(),
            is_tag_result: true,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["captured_at_utc"], "2025-05-01T12:00:00Z");
        assert_eq!(json["is_tag_result"], true);
        assert_eq!(json["permalink"], "");
    }
}
