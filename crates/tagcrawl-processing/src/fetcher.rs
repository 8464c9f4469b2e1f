//! Content fetcher: one bounded GET per item, then JPEG normalization.

use crate::error::ProcessingError;
use crate::transcode::ImageTranscoder;
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves a media payload and returns it as JPEG bytes.
///
/// Implementations perform no internal retries.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_and_transcode(&self, source_url: &str) -> Result<Vec<u8>, ProcessingError>;
}

/// HTTP implementation backed by `reqwest`.
#[derive(Clone)]
pub struct HttpContentFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_size_bytes: usize,
    transcoder: ImageTranscoder,
}

impl HttpContentFetcher {
    pub fn new(
        timeout: Duration,
        max_size_bytes: usize,
        jpeg_quality: u8,
    ) -> Result<Self, ProcessingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessingError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            max_size_bytes,
            transcoder: ImageTranscoder::new(jpeg_quality),
        })
    }

    /// Download the raw payload, enforcing the size cap while streaming.
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, ProcessingError> {
        let mut response = self
            .client
            .get(source_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProcessingError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProcessingError::Fetch(format!(
                "Source returned status code: {}",
                response.status()
            )));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_size_bytes {
                return Err(ProcessingError::TooLarge {
                    size: len as usize,
                    max: self.max_size_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProcessingError::Fetch(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_size_bytes {
                return Err(ProcessingError::TooLarge {
                    size: body.len() + chunk.len(),
                    max: self.max_size_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_and_transcode(&self, source_url: &str) -> Result<Vec<u8>, ProcessingError> {
        let start = std::time::Instant::now();
        let raw = self.fetch(source_url).await?;
        let raw_size = raw.len();

        // Decoding is CPU bound; keep it off the async workers.
        let transcoder = self.transcoder;
        let jpeg = tokio::task::spawn_blocking(move || transcoder.to_jpeg(&raw))
            .await
            .map_err(|e| ProcessingError::Decode(format!("Transcode task failed: {}", e)))??;

        tracing::debug!(
            source_url = %source_url,
            raw_bytes = raw_size,
            jpeg_bytes = jpeg.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fetched and transcoded media"
        );

        Ok(jpeg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 5, Rgba([0, 128, 255, 64])))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn fetcher(max_size_bytes: usize) -> HttpContentFetcher {
        HttpContentFetcher::new(Duration::from_secs(5), max_size_bytes, 75).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_and_transcode_png() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/a.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(png_bytes())
            .create_async()
            .await;

        let jpeg = fetcher(1024 * 1024)
            .fetch_and_transcode(&format!("{}/a.png", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.jpg")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher(1024)
            .fetch_and_transcode(&format!("{}/gone.jpg", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Fetch(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_oversized_payload_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/big.png")
            .with_status(200)
            .with_body(vec![0u8; 4096])
            .create_async()
            .await;

        let err = fetcher(1024)
            .fetch_and_transcode(&format!("{}/big.png", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessingError::TooLarge { max: 1024, .. }));
    }

    #[tokio::test]
    async fn test_non_image_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html></html>")
            .create_async()
            .await;

        let err = fetcher(1024)
            .fetch_and_transcode(&format!("{}/page", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Decode(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let err = fetcher(1024)
            .fetch_and_transcode("http://127.0.0.1:1/unreachable.jpg")
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Fetch(_)));
    }
}
