//! Manual storefront review: after a fetch, the operator pages through the
//! resulting product URLs one by one to eyeball the rendered listings. The
//! state is a plain linear cursor — forward, back, skip, reset.

use crate::models::ReconciledRow;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::info;

#[derive(Debug, Default)]
pub struct ReviewCursor {
    urls: Vec<String>,
    pos: usize,
    skipped: usize,
}

impl ReviewCursor {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls, pos: 0, skipped: 0 }
    }

    /// Cursor over the review URLs of a reconciled result set.
    pub fn from_rows(rows: &[ReconciledRow]) -> Self {
        Self::new(rows.iter().filter_map(|r| r.listing.url.clone()).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// The URL under the cursor; None once the end is reached.
    pub fn current(&self) -> Option<&str> {
        self.urls.get(self.pos).map(String::as_str)
    }

    /// Advance. Saturates at one past the last entry.
    pub fn forward(&mut self) -> Option<&str> {
        if self.pos < self.urls.len() {
            self.pos += 1;
        }
        self.current()
    }

    /// Step back. Saturates at the first entry.
    pub fn back(&mut self) -> Option<&str> {
        self.pos = self.pos.saturating_sub(1);
        self.current()
    }

    /// Advance, counting the current entry as skipped rather than reviewed.
    pub fn skip(&mut self) -> Option<&str> {
        if self.pos < self.urls.len() {
            self.skipped += 1;
            self.pos += 1;
        }
        self.current()
    }

    /// Back to the first entry; the skip count survives for the summary.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// (1-based position, total, skipped so far)
    pub fn progress(&self) -> (usize, usize, usize) {
        (self.pos.min(self.urls.len().saturating_sub(1)) + 1, self.urls.len(), self.skipped)
    }
}

/// Interactive loop over the cursor: prints the current URL, reads one-letter
/// commands from the operator until quit or the list runs out.
pub fn run_review<R: BufRead, W: Write>(
    cursor: &mut ReviewCursor,
    input: R,
    mut output: W,
) -> Result<()> {
    if cursor.is_empty() {
        writeln!(output, "No URLs to review.")?;
        return Ok(());
    }

    writeln!(output, "{} URLs to review.", cursor.len())?;
    prompt(cursor, &mut output)?;

    for line in input.lines() {
        let line = line?;
        match line.trim() {
            "n" | "" => {
                cursor.forward();
            }
            "b" => {
                cursor.back();
            }
            "s" => {
                cursor.skip();
            }
            "r" => cursor.reset(),
            "q" => break,
            other => {
                writeln!(output, "Unknown command {:?} — n/b/s/r/q", other)?;
                continue;
            }
        }

        if cursor.current().is_none() {
            writeln!(output, "End of list.")?;
            break;
        }
        prompt(cursor, &mut output)?;
    }

    let (_, total, skipped) = cursor.progress();
    info!("Review finished: {} URLs, {} skipped", total, skipped);
    Ok(())
}

fn prompt<W: Write>(cursor: &ReviewCursor, output: &mut W) -> Result<()> {
    let (pos, total, _) = cursor.progress();
    if let Some(url) = cursor.current() {
        writeln!(output, "[{}/{}] {}", pos, total, url)?;
        write!(output, "[n]ext [b]ack [s]kip [r]eset [q]uit > ")?;
        output.flush()?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
