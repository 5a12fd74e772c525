//! Fetch orchestrator: expand the master, walk the derived codes against one
//! storefront strictly one request at a time, then reconcile.
//!
//! The loop never aborts on a single code: HTML drift, zero hits and
//! transport failures all demote to per-item skips, surfaced only through
//! the run stats and the not-found table. Partial results beat total failure
//! on a loop that takes two seconds per code by contract.

use crate::catalog;
use crate::http::FetchError;
use crate::models::{ExpandedCode, ListingRecord, MasterRow, ReconciledRow, SourceKind};
use crate::reconcile::{not_found_rows, reconcile};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

// ── Source trait ──────────────────────────────────────────────────────────────

/// One storefront the fetch loop can query. Implementations resolve a single
/// derived code to at most one listing; any error demotes to a per-item skip
/// in the loop below.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// `Ok(None)` = the code is legitimately absent from this storefront.
    async fn fetch_listing(&self, code: &ExpandedCode)
    -> Result<Option<ListingRecord>, FetchError>;
}

#[derive(Debug, Default)]
pub struct FetchStats {
    pub codes_processed: usize,
    pub listings_found: usize,
    /// Codes the storefront simply didn't have (zero hits / no detail block).
    pub misses: usize,
    /// Codes dropped by a fetch or parse failure.
    pub skipped: usize,
}

#[derive(Debug)]
pub struct FetchReport {
    pub kind: SourceKind,
    pub rows: Vec<ReconciledRow>,
    pub not_found: Vec<MasterRow>,
    pub stats: FetchStats,
}

pub struct Pipeline<'a> {
    source: &'a dyn ListingSource,
    kind: SourceKind,
    request_delay: Duration,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn ListingSource, kind: SourceKind, request_delay_ms: u64) -> Self {
        Self {
            source,
            kind,
            request_delay: Duration::from_millis(request_delay_ms),
        }
    }

    pub async fn run(&self, master: &[MasterRow]) -> Result<FetchReport> {
        let codes = if self.kind.uses_expanded_codes() {
            catalog::expand_rows(master)
        } else {
            catalog::identity_codes(master)
        };

        info!(
            "=== {}: fetching {} codes ({} master rows) ===",
            self.kind.label(),
            codes.len(),
            master.len()
        );

        let mut stats = FetchStats::default();
        let mut listings: Vec<ListingRecord> = Vec::new();

        for (idx, code) in codes.iter().enumerate() {
            stats.codes_processed += 1;

            match self.source.fetch_listing(code).await {
                Ok(Some(listing)) => {
                    info!("[{}/{}] {}: ok", idx + 1, codes.len(), code.code);
                    stats.listings_found += 1;
                    listings.push(listing);
                }
                Ok(None) => {
                    info!("[{}/{}] {}: no hits", idx + 1, codes.len(), code.code);
                    stats.misses += 1;
                }
                Err(e) => {
                    warn!("[{}/{}] {}: skipped ({})", idx + 1, codes.len(), code.code, e);
                    stats.skipped += 1;
                }
            }

            // Vendor rate-limit compliance: 30 req/min, so a fixed pause
            // after every call, success or not, the last one included.
            sleep(self.request_delay).await;
        }

        let rows = reconcile(&listings, &codes);
        let not_found = not_found_rows(master, &listings, self.kind.uses_expanded_codes());

        info!(
            "=== {}: {} listings | {} misses | {} skipped | {} not found ===",
            self.kind.label(),
            stats.listings_found,
            stats.misses,
            stats.skipped,
            not_found.len()
        );

        Ok(FetchReport {
            kind: self.kind,
            rows,
            not_found,
            stats,
        })
    }
}

/// Derived codes for display in the `expand` dry run.
pub fn expansion_preview(master: &[MasterRow]) -> Vec<ExpandedCode> {
    catalog::expand_rows(master)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
