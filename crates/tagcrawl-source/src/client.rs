//! HTTP client for the Graph API.

use crate::error::SourceError;
use crate::types::{GraphEnvelope, GraphMediaItem, HashtagNode, MEDIA_FIELDS};
use crate::MediaSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tagcrawl_core::{normalize_tag, Config, MediaDescriptor, SearchMode};

/// Longest slice of an error body kept in a [`SourceError::Http`].
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`GraphClient`].
#[derive(Clone)]
pub struct GraphClientConfig {
    pub base_url: String,
    pub access_token: String,
    /// Account the requests are made on behalf of.
    pub account_id: String,
    pub tag_lookup_timeout: Duration,
    pub media_list_timeout: Duration,
}

impl GraphClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.graph_api_base_url().to_string(),
            access_token: config.graph_access_token().to_string(),
            account_id: config.graph_business_account_id().to_string(),
            tag_lookup_timeout: Duration::from_secs(config.tag_lookup_timeout_secs()),
            media_list_timeout: Duration::from_secs(config.media_list_timeout_secs()),
        }
    }
}

/// Graph API adapter. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    access_token: String,
    account_id: String,
    tag_lookup_timeout: Duration,
    media_list_timeout: Duration,
}

impl GraphClient {
    pub fn new(config: GraphClientConfig) -> Result<Self, SourceError> {
        if config.access_token.trim().is_empty() {
            return Err(SourceError::InvalidInput(
                "Graph access token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token,
            account_id: config.account_id,
            tag_lookup_timeout: config.tag_lookup_timeout,
            media_list_timeout: config.media_list_timeout,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and unwrap the `data` array of the response.
    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Vec<T>, SourceError> {
        let response = self
            .client
            .get(self.build_url(path))
            .query(query)
            .query(&[("access_token", self.access_token.as_str())])
            .timeout(timeout)
            .send()
            .await
            // The URL carries the access token; keep it out of errors and logs.
            .map_err(|e| SourceError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.without_url().to_string()))?;

        let envelope = serde_json::from_str::<GraphEnvelope<T>>(&body);

        if !status.is_success() {
            if let Ok(GraphEnvelope {
                error: Some(error), ..
            }) = envelope
            {
                return Err(SourceError::Api {
                    code: error.code,
                    message: error.message,
                });
            }
            return Err(SourceError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let envelope = envelope.map_err(|e| SourceError::Malformed(e.to_string()))?;
        if let Some(error) = envelope.error {
            return Err(SourceError::Api {
                code: error.code,
                message: error.message,
            });
        }

        envelope
            .data
            .ok_or_else(|| SourceError::Malformed("Response has no data array".to_string()))
    }
}

#[async_trait]
impl MediaSource for GraphClient {
    async fn resolve_tag_id(&self, tag_name: &str) -> Result<String, SourceError> {
        let tag = normalize_tag(tag_name);
        if tag.is_empty() {
            return Err(SourceError::InvalidInput(
                "Tag is empty after normalization".to_string(),
            ));
        }

        let query = [
            ("user_id", self.account_id.clone()),
            ("q", tag.clone()),
        ];

        match self
            .get_data::<HashtagNode>("ig_hashtag_search", &query, self.tag_lookup_timeout)
            .await
        {
            Ok(nodes) => match nodes.into_iter().map(|n| n.id).find(|id| !id.is_empty()) {
                Some(id) => {
                    tracing::debug!(tag = %tag, tag_id = %id, "Resolved hashtag");
                    Ok(id)
                }
                None => {
                    tracing::info!(tag = %tag, "No hashtag matched");
                    Err(SourceError::NotFound(tag))
                }
            },
            Err(e) => {
                tracing::error!(tag = %tag, error = %e, "Hashtag lookup failed");
                Err(SourceError::NotFound(tag))
            }
        }
    }

    async fn list_media(
        &self,
        tag_id: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<MediaDescriptor>, SourceError> {
        let path = format!("{}/{}", tag_id, mode.edge());
        let query = [
            ("user_id", self.account_id.clone()),
            ("fields", MEDIA_FIELDS.to_string()),
            ("limit", limit.to_string()),
        ];

        let items = self
            .get_data::<GraphMediaItem>(&path, &query, self.media_list_timeout)
            .await
            .inspect_err(|e| {
                tracing::error!(tag_id = %tag_id, mode = %mode, error = %e, "Media listing failed");
            })?;

        tracing::info!(
            tag_id = %tag_id,
            mode = %mode,
            requested = limit,
            returned = items.len(),
            "Listed tag media"
        );

        Ok(items.into_iter().map(MediaDescriptor::from).collect())
    }

    async fn list_owner_media(&self, owner_id: &str) -> Result<Vec<MediaDescriptor>, SourceError> {
        let path = format!("{}/media", owner_id);
        let query = [("fields", MEDIA_FIELDS.to_string())];

        let items = self
            .get_data::<GraphMediaItem>(&path, &query, self.media_list_timeout)
            .await
            .inspect_err(|e| {
                tracing::error!(owner_id = %owner_id, error = %e, "Owner media listing failed");
            })?;

        tracing::info!(owner_id = %owner_id, returned = items.len(), "Listed owner media");

        Ok(items.into_iter().map(MediaDescriptor::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use tagcrawl_core::MediaKind;

    fn client(server: &mockito::Server) -> GraphClient {
        GraphClient::new(GraphClientConfig {
            base_url: format!("{}/", server.url()),
            access_token: "secret-token".to_string(),
            account_id: "1784".to_string(),
            tag_lookup_timeout: Duration::from_secs(5),
            media_list_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_tag_id_normalizes_and_queries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ig_hashtag_search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "1784".into()),
                Matcher::UrlEncoded("q".into(), "sunset".into()),
                Matcher::UrlEncoded("access_token".into(), "secret-token".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data": [{"id": "999"}]}"#)
            .create_async()
            .await;

        let id = client(&server).resolve_tag_id("  ##sunset ").await.unwrap();

        mock.assert_async().await;
        assert_eq!(id, "999");
    }

    #[tokio::test]
    async fn test_resolve_empty_tag_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client(&server).resolve_tag_id(" # ").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, SourceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_resolve_failures_collapse_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ig_hashtag_search")
            .match_query(Matcher::UrlEncoded("q".into(), "empty".into()))
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/ig_hashtag_search")
            .match_query(Matcher::UrlEncoded("q".into(), "denied".into()))
            .with_status(400)
            .with_body(r#"{"error": {"message": "Invalid OAuth access token.", "code": 190}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/ig_hashtag_search")
            .match_query(Matcher::UrlEncoded("q".into(), "garbled".into()))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client(&server);
        for tag in ["empty", "denied", "garbled"] {
            let err = client.resolve_tag_id(tag).await.unwrap_err();
            assert!(matches!(err, SourceError::NotFound(ref t) if t == tag), "{tag}: {err}");
        }
    }

    #[tokio::test]
    async fn test_list_media_maps_descriptors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/999/top_media")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "1784".into()),
                Matcher::UrlEncoded("fields".into(), MEDIA_FIELDS.into()),
                Matcher::UrlEncoded("limit".into(), "7".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"id": "A", "media_type": "IMAGE", "media_url": "https://cdn/a.jpg", "caption": "hi", "permalink": "https://p/A", "timestamp": "2025-05-01T10:00:00+0000"},
                    {"id": "C", "media_type": "VIDEO"}
                ], "paging": {"cursors": {"after": "x"}}}"#,
            )
            .create_async()
            .await;

        let media = client(&server)
            .list_media("999", SearchMode::Top, 7)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].id, "A");
        assert_eq!(media[0].kind, MediaKind::Image);
        assert_eq!(media[0].usable_source_url(), Some("https://cdn/a.jpg"));
        assert_eq!(media[0].caption, "hi");
        assert_eq!(media[1].kind, MediaKind::Video);
        assert_eq!(media[1].source_url, None);
    }

    #[tokio::test]
    async fn test_list_media_error_object_is_source_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/999/recent_media")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": {"message": "rate limited", "code": 4}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .list_media("999", SearchMode::Recent, 7)
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Api { code: Some(4), .. }));
    }

    #[tokio::test]
    async fn test_list_media_server_error_does_not_leak_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/999/recent_media")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let err = client(&server)
            .list_media("999", SearchMode::Recent, 7)
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Http { status: 503, .. }));
        assert!(!err.to_string().contains("secret-token"));
    }

    #[tokio::test]
    async fn test_list_owner_media() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/1784/media")
            .match_query(Matcher::UrlEncoded("fields".into(), MEDIA_FIELDS.into()))
            .with_status(200)
            .with_body(r#"{"data": [{"id": "42", "media_type": "CAROUSEL_ALBUM"}]}"#)
            .create_async()
            .await;

        let media = client(&server).list_owner_media("1784").await.unwrap();

        assert_eq!(media.len(), 1);
        assert_eq!(media[0].kind, MediaKind::CarouselAlbum);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let result = GraphClient::new(GraphClientConfig {
            base_url: "https://graph.example.com/".to_string(),
            access_token: " ".to_string(),
            account_id: "1".to_string(),
            tag_lookup_timeout: Duration::from_secs(1),
            media_list_timeout: Duration::from_secs(1),
        });
        assert!(result.is_err());
    }
}
