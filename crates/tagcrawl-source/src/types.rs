//! Wire types of the Graph API responses.

use serde::Deserialize;
use tagcrawl_core::{MediaDescriptor, MediaKind};

/// Field list requested for every media listing.
pub const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,permalink,timestamp";

/// Top-level response: either a `data` array or an `error` object.
#[derive(Debug, Deserialize)]
pub struct GraphEnvelope<T> {
    pub data: Option<Vec<T>>,
    pub error: Option<GraphApiError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HashtagNode {
    pub id: String,
}

/// A media node. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct GraphMediaItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl From<GraphMediaItem> for MediaDescriptor {
    fn from(item: GraphMediaItem) -> Self {
        MediaDescriptor {
            id: item.id.unwrap_or_default(),
            kind: MediaKind::from(item.media_type.unwrap_or_default()),
            source_url: item.media_url,
            caption: item.caption.unwrap_or_default(),
            permalink: item.permalink.unwrap_or_default(),
            timestamp: item.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_become_explicit_defaults() {
        let item: GraphMediaItem = serde_json::from_str(r#"{"id": "17", "media_type": "IMAGE"}"#).unwrap();
        let descriptor = MediaDescriptor::from(item);

        assert_eq!(descriptor.id, "17");
        assert!(descriptor.kind.is_image());
        assert_eq!(descriptor.source_url, None);
        assert_eq!(descriptor.caption, "");
        assert_eq!(descriptor.permalink, "");
        assert_eq!(descriptor.timestamp, None);
    }

    #[test]
    fn test_envelope_with_error_object() {
        let envelope: GraphEnvelope<HashtagNode> = serde_json::from_str(
            r#"{"error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}}"#,
        )
        .unwrap();

        assert!(envelope.data.is_none());
        let error = envelope.error.unwrap();
        assert_eq!(error.code, Some(190));
        assert_eq!(error.kind.as_deref(), Some("OAuthException"));
    }
}
