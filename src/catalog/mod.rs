//! Code expansion: turn master rows into the derived (code, expected price)
//! set the marketplace fetches query.
//!
//! Suffixes encode physical package sizes (50g..500g) sold as separate
//! listings. Category 1 products may carry explicit per-tier prices
//! (販売単価1..5) that override the naive unit-price × multiplier; category 2
//! products ship in one extra size only; everything else sells at the master
//! price under the unchanged code.

pub mod price;

use crate::models::{ExpandedCode, MasterRow};
use std::collections::HashSet;

use self::price::parse_opt_price;

/// Expand every master row and deduplicate derived codes, keeping the first
/// occurrence. Order is deterministic: row order, then suffix order.
pub fn expand_rows(rows: &[MasterRow]) -> Vec<ExpandedCode> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        for code in expand_row(row) {
            if seen.insert(code.code.clone()) {
                out.push(code);
            }
        }
    }
    out
}

/// Expand a single master row according to its category.
pub fn expand_row(row: &MasterRow) -> Vec<ExpandedCode> {
    match row.category {
        1 => expand_category_one(row),
        2 => vec![derived(row, "-50", unit_price(row))],
        _ => vec![derived(row, "", unit_price(row))],
    }
}

/// The identity code set used by the site scrape: one unsuffixed entry per
/// master row at the master price, no category branching.
pub fn identity_codes(rows: &[MasterRow]) -> Vec<ExpandedCode> {
    rows.iter().map(|row| derived(row, "", unit_price(row))).collect()
}

fn expand_category_one(row: &MasterRow) -> Vec<ExpandedCode> {
    let tiers: Vec<Option<f64>> = (1..=5).map(|n| tier_price(row, n)).collect();

    if tiers.iter().any(Option::is_some) {
        // Tiered branch: -50 and -100 both take 販売単価1 as-is, then
        // -200..-500 take 販売単価n × n. A missing/zero tier still emits its
        // row, with an unparseable expected price.
        let mut out = Vec::with_capacity(6);
        out.push(derived(row, "-50", tiers[0]));
        out.push(derived(row, "-100", tiers[0]));
        for n in 2..=5usize {
            let expected = tiers[n - 1].map(|p| p * n as f64);
            out.push(derived(row, &format!("-{}00", n), expected));
        }
        out
    } else {
        // Legacy branch (all tiers empty/zero): unit price × 1..5 for
        // -100..-500. There is no -50 here; the asymmetry with the tiered
        // branch is long-standing behaviour, kept as-is.
        (1..=5usize)
            .map(|n| derived(row, &format!("-{}00", n), unit_price(row).map(|p| p * n as f64)))
            .collect()
    }
}

/// 販売単価n, treating empty / unparseable / non-positive as absent.
fn tier_price(row: &MasterRow, n: usize) -> Option<f64> {
    parse_opt_price(row.tiered_prices[n - 1].as_deref()).filter(|p| *p > 0.0)
}

fn unit_price(row: &MasterRow) -> Option<f64> {
    parse_opt_price(row.unit_price.as_deref())
}

fn derived(row: &MasterRow, suffix: &str, expected_price: Option<f64>) -> ExpandedCode {
    ExpandedCode {
        code: format!("{}{}", row.code, suffix),
        expected_price,
        shipping_class: row.shipping_class.clone(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
