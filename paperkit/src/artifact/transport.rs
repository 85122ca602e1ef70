//! HTTP transport abstraction for artifact downloads.
//!
//! The fetcher only needs three operations: a HEAD probe, a small GET for
//! JSON documents, and a streamed GET into a writer. Keeping them behind
//! [`HttpTransport`] lets the download pipeline run against an in-memory
//! double in tests.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("paperkit/", env!("CARGO_PKG_VERSION"));

/// Errors raised by an [`HttpTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Request or body transfer exceeded the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection or protocol failure.
    #[error("request to {url} failed: {reason}")]
    Request {
        url: String,
        reason: String,
        retryable: bool,
    },

    /// Writing the response body failed.
    #[error("failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether another attempt might succeed.
    ///
    /// Timeouts, connection failures, rate limiting and server errors are
    /// transient; client errors and local I/O failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
            TransportError::Timeout { .. } => true,
            TransportError::Request { retryable, .. } => *retryable,
            TransportError::Io(_) => false,
        }
    }

    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                retryable: error.is_connect() || error.is_body(),
                reason: error.to_string(),
            }
        }
    }
}

/// Minimal HTTP operations used by the fetcher and distribution resolver.
pub trait HttpTransport: Send + Sync + 'static {
    /// Issue a HEAD request. Returns `Ok(true)` for a success status and
    /// `Ok(false)` for any other status.
    fn probe(&self, url: &Url) -> impl Future<Output = Result<bool, TransportError>> + Send;

    /// GET a (small) resource fully into memory.
    fn get_bytes(&self, url: &Url)
        -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Stream a GET response body into `sink`, returning the bytes written.
    fn download_to<W>(
        &self,
        url: &Url,
        sink: &mut W,
    ) -> impl Future<Output = Result<u64, TransportError>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ReqwestTransport {
    /// Create a transport with request and connect timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
                retryable: false,
            })?;

        Ok(Self { client, timeout })
    }

    /// Request timeout this transport was built with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn get_checked(&self, url: &Url) -> Result<reqwest::Response, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

impl HttpTransport for ReqwestTransport {
    async fn probe(&self, url: &Url) -> Result<bool, TransportError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        trace!(url = %url, status = response.status().as_u16(), "HEAD probe");
        Ok(response.status().is_success())
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self.get_checked(url).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| TransportError::from_reqwest(url, e))
    }

    async fn download_to<W>(&self, url: &Url, sink: &mut W) -> Result<u64, TransportError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut response = self.get_checked(url).await?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?
        {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;

        Ok(written)
    }
}
