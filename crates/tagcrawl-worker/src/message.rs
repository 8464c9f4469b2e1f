use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tagcrawl_core::constants::DEFAULT_PLATFORM;
use tagcrawl_core::normalize_tag;

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

/// Body of a crawl job: `{"hashtag": "<term>", "platform": "instagram"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlMessage {
    pub hashtag: String,
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl CrawlMessage {
    pub fn new(hashtag: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            hashtag: hashtag.into(),
            platform: platform.into(),
        }
    }

    /// Parse and validate a queue message body.
    pub fn parse(body: &str) -> Result<Self> {
        let message: CrawlMessage =
            serde_json::from_str(body).context("Crawl message is not valid JSON")?;
        if normalize_tag(&message.hashtag).is_empty() {
            return Err(anyhow!("Crawl message has a blank hashtag"));
        }
        Ok(message)
    }

    pub fn to_body(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize crawl message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_platform() {
        let message = CrawlMessage::parse(r##"{"hashtag": "#sunset"}"##).unwrap();
        assert_eq!(message.hashtag, "#sunset");
        assert_eq!(message.platform, "instagram");
    }

    #[test]
    fn test_parse_rejects_blank_or_missing_hashtag() {
        assert!(CrawlMessage::parse(r#"{"hashtag": "  # "}"#).is_err());
        assert!(CrawlMessage::parse(r#"{"platform": "instagram"}"#).is_err());
        assert!(CrawlMessage::parse("not json").is_err());
    }

    #[test]
    fn test_body_shape() {
        let body = CrawlMessage::new("sunset", "instagram").to_body().unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, serde_json::json!({"hashtag": "sunset", "platform": "instagram"}));
    }
}
