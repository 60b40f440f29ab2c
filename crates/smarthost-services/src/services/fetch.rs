//! Remote fetch for URL ingestion

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use smarthost_core::Config;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The remote answered with a non-2xx status.
    #[error("Failed to fetch image from URL: {url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Remote body exceeds maximum allowed size of {max} bytes")]
    TooLarge { max: usize },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// HTTP GET client used for URL ingestion.
///
/// The body is read in chunks and fully buffered, and reading stops as soon as the
/// configured size cap is crossed. A single timeout covers connect, headers and body.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_size: usize,
}

impl RemoteFetcher {
    pub fn new(
        timeout: Duration,
        max_size: usize,
        accept_invalid_certs: bool,
    ) -> Result<Self, FetchError> {
        if accept_invalid_certs {
            tracing::warn!("Remote fetch client accepts invalid TLS certificates");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_size,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            Duration::from_secs(config.fetch_timeout_secs()),
            config.fetch_max_size_bytes(),
            config.fetch_accept_invalid_certs(),
        )
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Network(err.to_string())
        }
    }

    /// GET `url` and return the full body.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = reqwest::Url::parse(url.trim())
            .map_err(|_| FetchError::InvalidUrl(format!("Invalid URL format: {}", url)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(
                "Only HTTP and HTTPS URLs are allowed".to_string(),
            ));
        }

        let start = std::time::Instant::now();
        tracing::info!(url = %parsed, "Fetching remote object");

        let response = self.client.get(parsed).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to download from URL");
            self.classify(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Remote returned non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_size as u64 {
                return Err(FetchError::TooLarge { max: self.max_size });
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            if body.len() + chunk.len() > self.max_size {
                return Err(FetchError::TooLarge { max: self.max_size });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::info!(
            url = %url,
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote fetch complete"
        );

        Ok(body.freeze())
    }
}
