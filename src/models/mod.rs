// ── Product master ────────────────────────────────────────────────────────────

/// One row of the uploaded product master CSV (汎用明細表 M04).
/// Prices stay as raw strings here; normalisation happens at expansion time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterRow {
    pub code: String,
    /// 大分類コード — drives the code expansion branch.
    pub category: i64,
    /// 通販単価 — may be empty or comma-formatted.
    pub unit_price: Option<String>,
    /// 販売単価1..5 — explicit per-package-size prices, rarely filled.
    pub tiered_prices: [Option<String>; 5],
    /// 送料区分名 — free-text shipping class label, copied through.
    pub shipping_class: Option<String>,
}

// ── Derived code ──────────────────────────────────────────────────────────────

/// A sellable variant derived from one master row: the master code with a
/// package-size suffix (or unchanged), paired with the price we expect the
/// storefront to show for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedCode {
    pub code: String,
    pub expected_price: Option<f64>,
    pub shipping_class: Option<String>,
}

// ── Fetched listing ───────────────────────────────────────────────────────────

/// One listing as observed on a storefront — site scrape or marketplace API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRecord {
    pub code: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub point: Option<i64>,
    /// 送料込 / 送料別 / shipping method name, vendor dependent.
    pub shipping_label: Option<String>,
    /// Stock message — site scrape only.
    pub stock: Option<String>,
    /// Icon badge labels — site scrape only.
    pub icons: Vec<String>,
    /// Listing URL for the manual review loop.
    pub url: Option<String>,
}

// ── Reconciled row ────────────────────────────────────────────────────────────

/// A listing joined back to its expected catalog price. This is the unit
/// displayed and exported.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRow {
    pub listing: ListingRecord,
    pub expected_price: Option<f64>,
    /// observed − expected, only when both sides parsed.
    pub price_delta: Option<f64>,
    pub shipping_class: Option<String>,
}

/// Which storefront a fetch ran against. Decides URL templates, export
/// column layout and the not-found comparison mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Site,
    Rakuten,
    Yahoo,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Site => "自社サイト",
            SourceKind::Rakuten => "楽天市場",
            SourceKind::Yahoo => "Yahoo!ショッピング",
        }
    }

    /// File-name stem for exports.
    pub fn slug(&self) -> &'static str {
        match self {
            SourceKind::Site => "site",
            SourceKind::Rakuten => "rakuten",
            SourceKind::Yahoo => "yahoo",
        }
    }

    /// Marketplace fetches query the expanded (suffixed) code set; the site
    /// scrape walks the master codes directly.
    pub fn uses_expanded_codes(&self) -> bool {
        !matches!(self, SourceKind::Site)
    }
}
