//! In-house shop integration: one HTTP GET per product code against the
//! detail page template, fields extracted by fixed CSS anchors.

pub mod parsers;

use crate::config::{HttpConfig, SiteConfig};
use crate::http::{FetchError, HttpClient};
use crate::models::{ExpandedCode, ListingRecord};
use crate::pipeline::ListingSource;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use self::parsers::parse_product_page;

pub struct SiteScraper {
    client: HttpClient,
    base_url: String,
}

impl SiteScraper {
    pub fn new(http: &HttpConfig, site: &SiteConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(http)?,
            base_url: site.base_url.clone(),
        })
    }

    /// Detail page URL: base + product code, no separator.
    pub fn product_url(&self, code: &str) -> String {
        format!("{}{}", self.base_url, code)
    }
}

#[async_trait]
impl ListingSource for SiteScraper {
    async fn fetch_listing(
        &self,
        code: &ExpandedCode,
    ) -> Result<Option<ListingRecord>, FetchError> {
        let url = self.product_url(&code.code);
        let html = self.client.get_text(&url).await?;

        let page = parse_product_page(&html)
            .map_err(|e| FetchError::Decode(format!("{}: {:#}", code.code, e)))?;

        let Some(page) = page else {
            debug!("{}: no product block", code.code);
            return Ok(None);
        };

        // Join key is the code printed on the page when present; pages
        // occasionally omit it, in which case the requested code stands in.
        let listing_code = page
            .code
            .map(|n| n.to_string())
            .unwrap_or_else(|| code.code.clone());

        Ok(Some(ListingRecord {
            code: listing_code,
            name: page.name,
            price: page.price,
            point: page.point,
            shipping_label: None,
            stock: page.stock,
            icons: page.icons,
            url: Some(url),
        }))
    }
}
