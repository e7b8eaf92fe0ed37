//! Snapshot fetching from the upstream introspection endpoint
//!
//! One call performs exactly one request. Retrying is left to the poll loop.

use crate::stats::error::{FetchError, FetchResult};
use crate::stats::types::Snapshot;
use reqwest::Url;
use std::future::Future;
use std::time::Duration;

/// Source of point-in-time counter snapshots
pub trait SnapshotSource: Send + Sync {
    /// Fetch one snapshot. Implementations must not retry internally.
    fn fetch(&self) -> impl Future<Output = FetchResult<Snapshot>> + Send;
}

/// Fetches snapshots over HTTP GET
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpSnapshotSource {
    /// Create a source for `url` with every request bounded by `timeout`
    pub fn new(url: Url, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Parse `url` and create a source
    pub fn from_str_url(url: &str, timeout: Duration) -> FetchResult<Self> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        Self::new(url, timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::RequestFailed(err.to_string())
        }
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self) -> impl Future<Output = FetchResult<Snapshot>> + Send {
        async move {
            let response = self
                .client
                .get(self.url.clone())
                .send()
                .await
                .map_err(|e| self.map_reqwest_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::BadStatus(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| self.map_reqwest_error(e))?;

            Snapshot::from_slice(&body)
        }
    }
}
