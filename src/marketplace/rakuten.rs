//! Rakuten Ichiba item search. The search is keyword-based and scoped to our
//! own shop; returned items are filtered down to those whose item URL resolves
//! to exactly the queried derived code, since near-match keywords bleed in.

use crate::config::{HttpConfig, RakutenConfig};
use crate::http::{FetchError, HttpClient};
use crate::models::{ExpandedCode, ListingRecord};
use crate::pipeline::ListingSource;
use anyhow::{Result, ensure};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::matcher::select_listing;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Items", default)]
    items: Vec<ItemWrapper>,
}

#[derive(Debug, Deserialize)]
struct ItemWrapper {
    #[serde(rename = "Item")]
    item: Item,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(rename = "itemUrl", default)]
    item_url: String,
    #[serde(rename = "itemName", default)]
    item_name: String,
    #[serde(rename = "itemPrice", default)]
    item_price: Option<f64>,
    #[serde(rename = "pointRate", default)]
    point_rate: Option<i64>,
    #[serde(rename = "postageFlag", default)]
    postage_flag: Option<i64>,
}

pub struct RakutenClient {
    client: HttpClient,
    config: RakutenConfig,
}

impl RakutenClient {
    pub fn new(http: &HttpConfig, config: &RakutenConfig) -> Result<Self> {
        ensure!(
            !config.application_id.is_empty(),
            "rakuten.application_id is not configured (set PRICE_RECON__RAKUTEN__APPLICATION_ID)"
        );
        Ok(Self {
            client: HttpClient::new(http)?,
            config: config.clone(),
        })
    }

    async fn search(&self, keyword: &str) -> Result<SearchResponse, FetchError> {
        let query = [
            ("format", "json".to_string()),
            ("shopCode", self.config.shop_code.clone()),
            ("keyword", keyword.to_string()),
            ("orFlag", "0".to_string()),
            ("hasReviewFlag", "0".to_string()),
            ("applicationId", self.config.application_id.clone()),
            ("availability", "1".to_string()),
            ("hits", self.config.hits.to_string()),
            ("page", "1".to_string()),
            ("sort", "+itemPrice".to_string()),
        ];
        self.client.get_json(&self.config.endpoint, &query).await
    }

    fn to_listing(&self, item: &Item, code: &str) -> ListingRecord {
        ListingRecord {
            code: code.to_string(),
            name: Some(item.item_name.clone()),
            price: item.item_price,
            point: item.point_rate,
            shipping_label: postage_label(item.postage_flag),
            stock: None,
            icons: Vec::new(),
            url: Some(item.item_url.clone()),
        }
    }
}

#[async_trait]
impl ListingSource for RakutenClient {
    async fn fetch_listing(
        &self,
        code: &ExpandedCode,
    ) -> Result<Option<ListingRecord>, FetchError> {
        let resp = self.search(&code.code).await?;

        // Exact-code candidates only: the shop's item slug *is* the derived
        // code, recovered by stripping the domain and affiliate suffix.
        let candidates: Vec<ListingRecord> = resp
            .items
            .iter()
            .filter(|w| {
                code_from_item_url(&w.item.item_url, &self.config.shop_code).as_deref()
                    == Some(code.code.as_str())
            })
            .map(|w| self.to_listing(&w.item, &code.code))
            .collect();

        debug!(
            "{}: {} hits, {} exact",
            code.code,
            resp.items.len(),
            candidates.len()
        );

        Ok(select_listing(&candidates, code.expected_price))
    }
}

/// Recover the bare item code from an item URL like
/// `https://item.rakuten.co.jp/tonya/123-50/?rafcid=wsc_i_is_...`.
pub fn code_from_item_url(item_url: &str, shop_code: &str) -> Option<String> {
    let url = Url::parse(item_url).ok()?;
    let mut segments = url.path_segments()?;
    if segments.next()? != shop_code {
        return None;
    }
    let code = segments.next()?;
    if code.is_empty() { None } else { Some(code.to_string()) }
}

fn postage_label(flag: Option<i64>) -> Option<String> {
    match flag {
        Some(0) => Some("送料込".to_string()),
        Some(1) => Some("送料別".to_string()),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_item_url() {
        let url = "https://item.rakuten.co.jp/tonya/123-50/?rafcid=wsc_i_is_1027604414937000350";
        assert_eq!(code_from_item_url(url, "tonya").as_deref(), Some("123-50"));
    }

    #[test]
    fn test_code_from_item_url_without_affiliate_suffix() {
        let url = "https://item.rakuten.co.jp/tonya/9001/";
        assert_eq!(code_from_item_url(url, "tonya").as_deref(), Some("9001"));
    }

    #[test]
    fn other_shop_urls_are_rejected() {
        let url = "https://item.rakuten.co.jp/otherstore/123-50/";
        assert_eq!(code_from_item_url(url, "tonya"), None);
    }

    #[test]
    fn garbage_urls_are_rejected() {
        assert_eq!(code_from_item_url("not a url", "tonya"), None);
        assert_eq!(code_from_item_url("https://item.rakuten.co.jp/", "tonya"), None);
    }

    #[test]
    fn search_response_decodes_and_filters() {
        let body = r#"{
            "Items": [
                {"Item": {"itemUrl": "https://item.rakuten.co.jp/tonya/123-100/?rafcid=wsc_i_is_1",
                          "itemName": "コーヒー 100g", "itemPrice": 980,
                          "pointRate": 1, "postageFlag": 1}},
                {"Item": {"itemUrl": "https://item.rakuten.co.jp/tonya/123-1000/",
                          "itemName": "コーヒー 1kg", "itemPrice": 4980,
                          "pointRate": 1, "postageFlag": 0}}
            ]
        }"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.items.len(), 2);

        let exact: Vec<_> = resp
            .items
            .iter()
            .filter(|w| {
                code_from_item_url(&w.item.item_url, "tonya").as_deref() == Some("123-100")
            })
            .collect();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].item.item_price, Some(980.0));
        assert_eq!(postage_label(exact[0].item.postage_flag).as_deref(), Some("送料別"));
    }

    #[test]
    fn empty_response_decodes() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.items.is_empty());
    }
}
