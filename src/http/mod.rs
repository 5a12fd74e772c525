use crate::config::HttpConfig;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure modes of a single outbound request. Everything here demotes to a
/// per-item skip in the fetch loop; only `RateLimited` is retried, and only
/// by the Yahoo client.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),
}

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// Fetch a URL as text. No retry here — the site scrape treats any
    /// failure as a per-item skip.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let resp = self.inner.get(url).send().await?;
        let resp = Self::check_status(resp)?;
        Ok(resp.text().await?)
    }

    /// Fetch a URL with query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        debug!("GET {} ({} params)", url, query.len());
        let resp = self.inner.get(url).query(query).send().await?;
        let resp = Self::check_status(resp)?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp)
    }
}
