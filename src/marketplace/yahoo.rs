//! Yahoo! Shopping item search (v3), scoped to our own seller. This API
//! actually returns 429s under the documented 30 req/min budget, so rate
//! limits are retried with a linearly growing backoff before the code is
//! given up as a skip.

use crate::config::{HttpConfig, YahooConfig};
use crate::http::{FetchError, HttpClient};
use crate::models::{ExpandedCode, ListingRecord};
use crate::pipeline::ListingSource;
use anyhow::{Result, ensure};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use super::matcher::select_listing;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    point: Option<Point>,
    #[serde(default)]
    shipping: Option<Shipping>,
}

#[derive(Debug, Deserialize)]
struct Point {
    #[serde(default)]
    times: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Shipping {
    #[serde(default)]
    name: Option<String>,
}

pub struct YahooClient {
    client: HttpClient,
    config: YahooConfig,
    max_retries: u32,
}

impl YahooClient {
    pub fn new(http: &HttpConfig, config: &YahooConfig) -> Result<Self> {
        ensure!(
            !config.app_id.is_empty(),
            "yahoo.app_id is not configured (set PRICE_RECON__YAHOO__APP_ID)"
        );
        Ok(Self {
            client: HttpClient::new(http)?,
            config: config.clone(),
            max_retries: http.max_retries,
        })
    }

    async fn search(&self, code: &str) -> Result<SearchResponse, FetchError> {
        let query = [
            ("appid", self.config.app_id.clone()),
            ("query", code.to_string()),
            ("hits", self.config.hits.to_string()),
            ("seller_id", self.config.seller_id.clone()),
        ];
        self.client.get_json(&self.config.endpoint, &query).await
    }

    fn to_listing(&self, hit: &Hit, code: &str) -> ListingRecord {
        ListingRecord {
            code: code.to_string(),
            name: hit.name.clone(),
            price: hit.price,
            point: hit.point.as_ref().and_then(|p| p.times),
            shipping_label: hit.shipping.as_ref().and_then(|s| s.name.clone()),
            stock: None,
            icons: Vec::new(),
            url: hit.url.clone(),
        }
    }
}

#[async_trait]
impl ListingSource for YahooClient {
    async fn fetch_listing(
        &self,
        code: &ExpandedCode,
    ) -> Result<Option<ListingRecord>, FetchError> {
        // Retries apply to 429s only; the attempt budget covers the first
        // request too, so the code is skipped after max_retries requests.
        let resp = RetryIf::spawn(
            backoff(self.max_retries),
            || async {
                let r = self.search(&code.code).await;
                if matches!(r, Err(FetchError::RateLimited)) {
                    warn!("{}: rate limited, backing off", code.code);
                }
                r
            },
            |e: &FetchError| matches!(e, FetchError::RateLimited),
        )
        .await?;

        debug!("{}: {} hits", code.code, resp.hits.len());

        // v3 search hits carry no bare item code to compare against, so the
        // whole hit set stands as candidates and price matching disambiguates.
        let candidates: Vec<ListingRecord> = resp
            .hits
            .iter()
            .map(|h| self.to_listing(h, &code.code))
            .collect();

        Ok(select_listing(&candidates, code.expected_price))
    }
}

/// Inter-attempt pauses, growing linearly by 5s. One pause fewer than the
/// attempt budget: 3 attempts pause 5s then 10s.
fn backoff(max_retries: u32) -> impl Iterator<Item = Duration> {
    (1..max_retries as u64).map(|i| Duration::from_secs(5 * i))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
