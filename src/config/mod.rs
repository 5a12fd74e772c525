use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub site: SiteConfig,
    pub rakuten: RakutenConfig,
    pub yahoo: YahooConfig,
    pub output: OutputConfig,
}

/// HTTP client + pacing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed delay after every outbound call. Both marketplace APIs allow
    /// 30 requests/minute, so this must stay ≥ 2000.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// In-house shop scraping configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Detail page URL prefix; the product code is appended verbatim.
    #[serde(default = "default_site_base_url")]
    pub base_url: String,
}

/// Rakuten Ichiba item search API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RakutenConfig {
    #[serde(default = "default_rakuten_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub application_id: String,

    #[serde(default = "default_shop")]
    pub shop_code: String,

    #[serde(default = "default_hits")]
    pub hits: u32,
}

/// Yahoo! Shopping item search (v3) API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YahooConfig {
    #[serde(default = "default_yahoo_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub app_id: String,

    #[serde(default = "default_shop")]
    pub seller_id: String,

    #[serde(default = "default_hits")]
    pub hits: u32,
}

/// Export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    2100
}
fn default_max_retries() -> u32 {
    3
}
fn default_user_agent() -> String {
    "price-recon/0.1 (storefront price reconciliation)".to_string()
}
fn default_site_base_url() -> String {
    "https://www.tonya.co.jp/shop/g/g".to_string()
}
fn default_rakuten_endpoint() -> String {
    "https://app.rakuten.co.jp/services/api/IchibaItem/Search/20170706".to_string()
}
fn default_yahoo_endpoint() -> String {
    "https://shopping.yahooapis.jp/ShoppingWebService/V3/itemSearch".to_string()
}
fn default_shop() -> String {
    "tonya".to_string()
}
fn default_hits() -> u32 {
    30
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("PRICE_RECON").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig {
                timeout_secs: default_timeout_secs(),
                request_delay_ms: default_request_delay_ms(),
                max_retries: default_max_retries(),
                user_agent: default_user_agent(),
            },
            site: SiteConfig {
                base_url: default_site_base_url(),
            },
            rakuten: RakutenConfig {
                endpoint: default_rakuten_endpoint(),
                application_id: String::new(),
                shop_code: default_shop(),
                hits: default_hits(),
            },
            yahoo: YahooConfig {
                endpoint: default_yahoo_endpoint(),
                app_id: String::new(),
                seller_id: default_shop(),
                hits: default_hits(),
            },
            output: OutputConfig {
                dir: default_output_dir(),
            },
        }
    }
}
