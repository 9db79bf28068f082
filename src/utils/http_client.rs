//! HTTP client for playlist and guide downloads
//!
//! A thin wrapper over `reqwest` with a bounded total timeout. Non-success
//! statuses, timeouts, and connection failures all surface as
//! [`SourceError`] variants so callers can report a reason.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::errors::{AppResult, SourceError};

/// HTTP client with a total (connect + transfer) timeout per request
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client whose requests are bounded by `timeout` in total
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Fetch a URL and return the raw response body.
    ///
    /// Non-2xx statuses are errors; no decompression happens here - payload
    /// unwrapping is the caller's concern since it goes by magic bytes.
    pub async fn fetch_bytes(&self, url: &str) -> AppResult<Bytes> {
        debug!("Fetching {url}");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout {
                    url: url.to_string(),
                }
            } else {
                SourceError::Connection {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status,
                url: url.to_string(),
            }
            .into());
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout {
                    url: url.to_string(),
                }
            } else {
                SourceError::Connection {
                    url: url.to_string(),
                    message: format!("failed to read response body: {e}"),
                }
            }
        })?;

        debug!("Fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}
