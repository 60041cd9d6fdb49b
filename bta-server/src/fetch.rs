//! Upstream conference-week fetcher
//!
//! Retrieves the raw agenda page for one (year, week). A non-success
//! status surfaces as [`Error::Upstream`]; callers never retry, the
//! next scheduled cycle covers transient failures.

use async_trait::async_trait;
use bta_common::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Timeout for upstream page loads
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw agenda markup, replaceable in tests
#[async_trait]
pub trait AgendaFetcher: Send + Sync {
    /// Fetch the raw agenda page for one (year, week).
    async fn fetch_week(&self, year: i32, week: u32) -> Result<String>;
}

/// Production fetcher against the parliament website
pub struct HttpAgendaFetcher {
    http_client: Client,
    base_url: String,
}

impl HttpAgendaFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AgendaFetcher for HttpAgendaFetcher {
    async fn fetch_week(&self, year: i32, week: u32) -> Result<String> {
        let url = format!("{}?year={}&week={}", self.base_url, year, week);
        debug!(%url, "fetching agenda page");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "unexpected status {} from {url}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read body from {url}: {e}")))
    }
}
