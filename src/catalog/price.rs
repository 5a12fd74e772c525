//! Price normalisation: the master CSV, the scraped pages and the marketplace
//! APIs all hand us prices in slightly different shapes — comma-grouped
//! strings, bare integers, floats, empty cells. Everything funnels through
//! `parse_price` / `format_price` so the rest of the crate only sees
//! `Option<f64>` (None = unparseable, distinct from a parsed zero).

/// Parse a heterogeneous price representation.
/// "1,234" → 1234.0 | "500円（税込）" → 500.0 | "12pt" → 12.0 | "" → None
pub fn parse_price(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }

    let cleaned = s
        .replace(',', "")
        .trim_end_matches("円（税込）")
        .trim_end_matches("pt")
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return None;
    }

    // Integer first, then float — "nan"/"inf" strings must not sneak through.
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v as f64);
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Like `parse_price`, but treats a missing cell as unparseable too.
pub fn parse_opt_price(s: Option<&str>) -> Option<f64> {
    s.and_then(parse_price)
}

/// Render a normalised price back to the comma-grouped, zero-decimal form
/// used for display and export. None renders as the empty string.
pub fn format_price(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => group_thousands(v.round() as i64),
        _ => String::new(),
    }
}

/// Format an integer with thousands separators.
pub fn group_thousands(n: i64) -> String {
    let s = n.abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1,234"), Some(1234.0));
        assert_eq!(parse_price("500円（税込）"), Some(500.0));
        assert_eq!(parse_price("1,080円（税込）"), Some(1080.0));
        assert_eq!(parse_price("12pt"), Some(12.0));
        assert_eq!(parse_price("800.5"), Some(800.5));
        assert_eq!(parse_price("  640 "), Some(640.0));
    }

    #[test]
    fn test_parse_price_unparseable() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("   "), None);
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("NaN"), None);
    }

    #[test]
    fn test_zero_is_not_unparseable() {
        assert_eq!(parse_price("0"), Some(0.0));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(1234567.0)), "1,234,567");
        assert_eq!(format_price(Some(0.0)), "0");
        assert_eq!(format_price(Some(999.0)), "999");
        assert_eq!(format_price(None), "");
    }

    #[test]
    fn test_round_trip() {
        for v in [0.0, 1.0, 999.0, 1_000.0, 1_234_567.0] {
            assert_eq!(parse_price(&format_price(Some(v))), Some(v));
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(-42_000), "-42,000");
    }
}
