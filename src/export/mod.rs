//! CSV export. The tables land in Excel on the operators' side, so every file
//! is UTF-8 with BOM and prices are rendered in the comma-grouped display
//! form. Column orders match the original report layouts.

use crate::catalog::price::format_price;
use crate::models::{MasterRow, ReconciledRow, SourceKind};
use anyhow::{Context, Result};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const BOM: &[u8] = b"\xef\xbb\xbf";

const SITE_HEADERS: &[&str] = &[
    "No", "Name", "Price", "Point", "Stock", "Icon", "通販単価", "差額", "送料区分名",
];
const MARKETPLACE_HEADERS: &[&str] = &[
    "itemCode", "itemName", "itemPrice", "pointRate", "postageFlag", "通販単価", "差額", "送料区分名",
];
const MASTER_HEADERS: &[&str] = &[
    "商品コード", "大分類コード", "通販単価",
    "販売単価1", "販売単価2", "販売単価3", "販売単価4", "販売単価5",
    "送料区分名",
];

/// `{dir}/{stem}_{YYYYmmdd_HHMMSS}.csv`
pub fn timestamped_path(dir: &Path, stem: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.csv", stem, stamp))
}

/// Write the reconciled table for one source.
pub fn write_report(dir: &Path, kind: SourceKind, rows: &[ReconciledRow]) -> Result<PathBuf> {
    let path = timestamped_path(dir, kind.slug());
    write_file(&path, &render_report(kind, rows)?)?;
    info!("{} rows exported to {:?}", rows.len(), path);
    Ok(path)
}

/// Write the not-found table (master rows with no listing).
pub fn write_not_found(dir: &Path, kind: SourceKind, rows: &[MasterRow]) -> Result<PathBuf> {
    let path = timestamped_path(dir, &format!("{}_not_found", kind.slug()));
    write_file(&path, &render_not_found(rows)?)?;
    info!("{} not-found rows exported to {:?}", rows.len(), path);
    Ok(path)
}

pub fn render_report(kind: SourceKind, rows: &[ReconciledRow]) -> Result<Vec<u8>> {
    let mut buf = Vec::from(BOM);
    let mut w = csv::Writer::from_writer(&mut buf);

    match kind {
        SourceKind::Site => {
            w.write_record(SITE_HEADERS)?;
            for r in rows {
                let l = &r.listing;
                w.write_record([
                    l.code.clone(),
                    l.name.clone().unwrap_or_default(),
                    format_price(l.price),
                    l.point.map(|p| p.to_string()).unwrap_or_default(),
                    l.stock.clone().unwrap_or_default(),
                    l.icons.join("/"),
                    format_price(r.expected_price),
                    format_price(r.price_delta),
                    r.shipping_class.clone().unwrap_or_default(),
                ])?;
            }
        }
        SourceKind::Rakuten | SourceKind::Yahoo => {
            w.write_record(MARKETPLACE_HEADERS)?;
            for r in rows {
                let l = &r.listing;
                w.write_record([
                    l.code.clone(),
                    l.name.clone().unwrap_or_default(),
                    format_price(l.price),
                    l.point.map(|p| p.to_string()).unwrap_or_default(),
                    l.shipping_label.clone().unwrap_or_default(),
                    format_price(r.expected_price),
                    format_price(r.price_delta),
                    r.shipping_class.clone().unwrap_or_default(),
                ])?;
            }
        }
    }

    w.flush()?;
    drop(w);
    Ok(buf)
}

pub fn render_not_found(rows: &[MasterRow]) -> Result<Vec<u8>> {
    let mut buf = Vec::from(BOM);
    let mut w = csv::Writer::from_writer(&mut buf);

    w.write_record(MASTER_HEADERS)?;
    for r in rows {
        let mut record = vec![
            r.code.clone(),
            r.category.to_string(),
            r.unit_price.clone().unwrap_or_default(),
        ];
        for tier in &r.tiered_prices {
            record.push(tier.clone().unwrap_or_default());
        }
        record.push(r.shipping_class.clone().unwrap_or_default());
        w.write_record(&record)?;
    }

    w.flush()?;
    drop(w);
    Ok(buf)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Could not create {:?}", path))?;
    file.write_all(bytes)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingRecord;

    fn reconciled(code: &str) -> ReconciledRow {
        ReconciledRow {
            listing: ListingRecord {
                code: code.to_string(),
                name: Some("コーヒー 100g".to_string()),
                price: Some(1080.0),
                point: Some(10),
                shipping_label: Some("送料別".to_string()),
                stock: Some("在庫あり".to_string()),
                icons: vec!["NEW".to_string(), "SALE".to_string()],
                url: None,
            },
            expected_price: Some(1000.0),
            price_delta: Some(80.0),
            shipping_class: Some("通常".to_string()),
        }
    }

    #[test]
    fn report_starts_with_bom() {
        let bytes = render_report(SourceKind::Rakuten, &[reconciled("123-100")]).unwrap();
        assert_eq!(&bytes[..3], BOM);
    }

    #[test]
    fn marketplace_report_layout() {
        let bytes = render_report(SourceKind::Yahoo, &[reconciled("123-100")]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "itemCode,itemName,itemPrice,pointRate,postageFlag,通販単価,差額,送料区分名"
        );
        assert_eq!(
            lines.next().unwrap(),
            "123-100,コーヒー 100g,\"1,080\",10,送料別,\"1,000\",80,通常"
        );
    }

    #[test]
    fn site_report_includes_stock_and_icons() {
        let bytes = render_report(SourceKind::Site, &[reconciled("12345")]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains("在庫あり"));
        assert!(text.contains("NEW/SALE"));
    }

    #[test]
    fn not_found_keeps_master_columns() {
        let row = MasterRow {
            code: "5678".to_string(),
            category: 3,
            unit_price: Some("800".to_string()),
            tiered_prices: Default::default(),
            shipping_class: Some("メール便".to_string()),
        };
        let bytes = render_not_found(&[row]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("商品コード,大分類コード"));
        assert_eq!(lines.next().unwrap(), "5678,3,800,,,,,,メール便");
    }

    #[test]
    fn timestamped_path_shape() {
        let p = timestamped_path(Path::new("out"), "rakuten");
        let name = p.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("rakuten_"));
        assert!(name.ends_with(".csv"));
        // rakuten_YYYYmmdd_HHMMSS.csv
        assert_eq!(name.len(), "rakuten_".len() + 15 + 4);
    }
}
