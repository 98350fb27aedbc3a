//! Header fetching module.
//!
//! The engine only needs one operation from the transport layer: fetch the
//! response headers for a URL within a timeout. The trait seam keeps the
//! scheduler testable and leaves the transport choice (direct client,
//! server-side proxy) to the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Headers and timing returned by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedHeaders {
    /// Response headers with lowercased names
    pub headers: HashMap<String, String>,
    /// Round-trip time in milliseconds
    pub response_time_ms: u64,
}

/// Transport-level fetch failures.
///
/// Always carries a human-readable message; the scheduler records it into
/// the owning site's history verbatim.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request exceeded its deadline and was cancelled
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection-level failure (DNS, refused, reset, TLS)
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// Fetches response headers for a URL.
#[async_trait]
pub trait HeaderFetcher: Send + Sync {
    /// Fetch headers, giving up after `timeout`.
    ///
    /// Non-2xx statuses are not errors: the response still carries the
    /// headers the classifier needs. Only transport failures error.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedHeaders, FetchError>;
}

/// Direct HTTP implementation using a HEAD request.
pub struct HttpHeaderFetcher {
    client: reqwest::Client,
}

impl HttpHeaderFetcher {
    /// Create a fetcher with connection pooling and a redirect cap.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }

    /// Create a fetcher around a custom client (for testing).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Classify a reqwest error into FetchError.
    fn classify_error(e: reqwest::Error, timeout: Duration) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(timeout.as_secs())
        } else {
            // All other errors treated as connection failures
            FetchError::ConnectionFailed(e.to_string())
        }
    }
}

impl Default for HttpHeaderFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HeaderFetcher for HttpHeaderFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedHeaders, FetchError> {
        let start = Instant::now();

        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify_error(e, timeout))?;

        let response_time_ms = start.elapsed().as_millis() as u64;

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        Ok(FetchedHeaders {
            headers,
            response_time_ms,
        })
    }
}
