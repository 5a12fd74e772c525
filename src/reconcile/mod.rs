//! Reconciliation: join fetched listings back to the expected catalog prices
//! and work out which master rows produced no listing at all.

use crate::models::{ExpandedCode, ListingRecord, MasterRow, ReconciledRow};
use std::collections::{HashMap, HashSet};

/// Left-join listings to their expected prices by derived code. Listings with
/// no matching expansion keep their observed side; the delta is computed only
/// when both sides parsed.
pub fn reconcile(listings: &[ListingRecord], expected: &[ExpandedCode]) -> Vec<ReconciledRow> {
    let by_code: HashMap<&str, &ExpandedCode> = expected
        .iter()
        .map(|e| (e.code.as_str(), e))
        .collect();

    listings
        .iter()
        .map(|listing| {
            let exp = by_code.get(listing.code.as_str());
            let expected_price = exp.and_then(|e| e.expected_price);
            let price_delta = match (listing.price, expected_price) {
                (Some(observed), Some(expected)) => Some(observed - expected),
                _ => None,
            };
            ReconciledRow {
                listing: listing.clone(),
                expected_price,
                price_delta,
                shipping_class: exp.and_then(|e| e.shipping_class.clone()),
            }
        })
        .collect()
}

/// Master rows for which no listing came back.
///
/// `expanded` mode (marketplace fetches): listing codes are reduced to the
/// pre-suffix master code before comparing, and category 1/2 rows are left
/// out entirely — their derived codes are synthetic and never equal the
/// master code, so they would all read as missing. The site scrape compares
/// codes verbatim and excludes nothing.
pub fn not_found_rows(
    master: &[MasterRow],
    listings: &[ListingRecord],
    expanded: bool,
) -> Vec<MasterRow> {
    let found: HashSet<String> = listings
        .iter()
        .map(|l| {
            if expanded {
                l.code.split('-').next().unwrap_or(&l.code).to_string()
            } else {
                l.code.clone()
            }
        })
        .collect();

    master
        .iter()
        .filter(|row| !(expanded && matches!(row.category, 1 | 2)))
        .filter(|row| !found.contains(&row.code))
        .cloned()
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
