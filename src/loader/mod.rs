//! Master CSV ingest. The upload is the one place where failure is fatal:
//! with no readable master there is nothing to expand or fetch.

use crate::models::MasterRow;
use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const COL_CODE: &str = "商品コード";
const COL_CATEGORY: &str = "大分類コード";
const COL_UNIT_PRICE: &str = "通販単価";
const COL_SHIPPING: &str = "送料区分名";
const COL_TIER_PREFIX: &str = "販売単価";

/// Load the product master from a CSV file.
pub fn load_master(path: &Path) -> Result<Vec<MasterRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open master CSV {:?}", path))?;
    let rows = load_master_from_reader(file)
        .with_context(|| format!("Could not read master CSV {:?}", path))?;
    info!("{} master rows loaded from {:?}", rows.len(), path);
    Ok(rows)
}

/// Parse the product master from any reader. Header-name driven so column
/// order in the export tool doesn't matter; 販売単価1..5 are optional.
pub fn load_master_from_reader<R: Read>(reader: R) -> Result<Vec<MasterRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let Some(code_idx) = col(COL_CODE) else {
        bail!("master CSV is missing the {} column", COL_CODE);
    };
    let Some(category_idx) = col(COL_CATEGORY) else {
        bail!("master CSV is missing the {} column", COL_CATEGORY);
    };
    let unit_idx = col(COL_UNIT_PRICE);
    let shipping_idx = col(COL_SHIPPING);
    let tier_idx: Vec<Option<usize>> =
        (1..=5).map(|n| col(&format!("{}{}", COL_TIER_PREFIX, n))).collect();

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: {}", i + 2, e);
                continue;
            }
        };

        let code = record.get(code_idx).unwrap_or("").trim().to_string();
        if code.is_empty() {
            continue;
        }

        let mut tiered_prices: [Option<String>; 5] = Default::default();
        for (slot, idx) in tiered_prices.iter_mut().zip(&tier_idx) {
            *slot = idx.and_then(|i| non_empty(record.get(i)));
        }

        rows.push(MasterRow {
            code,
            category: parse_category(record.get(category_idx).unwrap_or("")),
            unit_price: unit_idx.and_then(|i| non_empty(record.get(i))),
            tiered_prices,
            shipping_class: shipping_idx.and_then(|i| non_empty(record.get(i))),
        });
    }

    Ok(rows)
}

/// 大分類コード arrives as "1", sometimes "1.0" depending on the export tool.
fn parse_category(s: &str) -> i64 {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|v| v as i64))
        .unwrap_or(0)
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_rows_by_header_name() {
        let csv = "\
商品コード,大分類コード,通販単価,販売単価1,販売単価2,販売単価3,販売単価4,販売単価5,送料区分名
1234,1,\"1,000\",500,,,,,通常
5678,3,800,,,,,,メール便
";
        let rows = load_master_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].code, "1234");
        assert_eq!(rows[0].category, 1);
        assert_eq!(rows[0].unit_price.as_deref(), Some("1,000"));
        assert_eq!(rows[0].tiered_prices[0].as_deref(), Some("500"));
        assert_eq!(rows[0].tiered_prices[1], None);
        assert_eq!(rows[0].shipping_class.as_deref(), Some("通常"));

        assert_eq!(rows[1].category, 3);
        assert_eq!(rows[1].shipping_class.as_deref(), Some("メール便"));
    }

    #[test]
    fn tier_columns_are_optional() {
        let csv = "商品コード,大分類コード,通販単価\n9001,2,640\n";
        let rows = load_master_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tiered_prices, [None, None, None, None, None]);
    }

    #[test]
    fn missing_code_column_is_fatal() {
        let csv = "品名,大分類コード\nコーヒー,1\n";
        assert!(load_master_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn blank_code_rows_are_dropped() {
        let csv = "商品コード,大分類コード\n1234,3\n,3\n";
        let rows = load_master_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn float_category_codes_are_tolerated() {
        assert_eq!(parse_category("1.0"), 1);
        assert_eq!(parse_category("2"), 2);
        assert_eq!(parse_category(""), 0);
        assert_eq!(parse_category("雑貨"), 0);
    }
}
