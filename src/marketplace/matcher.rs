//! Listing selection: a keyword search for one derived code can return the
//! same product at several price points (package-size variants share nearly
//! identical keywords). When we know the expected price, the candidate within
//! one yen of it is the variant that was actually asked for; otherwise the
//! first candidate in vendor order wins — both APIs sort ascending by price,
//! so that is the cheapest.

use crate::models::ListingRecord;

/// Matching an expected price means being strictly within one yen of it.
/// The threshold mirrors the storefronts' integer pricing; flagged for
/// product-owner confirmation before changing.
const PRICE_TOLERANCE: f64 = 1.0;

/// Pick the single best candidate, or None for an empty set.
pub fn select_listing(candidates: &[ListingRecord], expected: Option<f64>) -> Option<ListingRecord> {
    if let Some(expected) = expected {
        for c in candidates {
            if let Some(price) = c.price {
                if (price - expected).abs() < PRICE_TOLERANCE {
                    return Some(c.clone());
                }
            }
        }
    }
    candidates.first().cloned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(code: &str, price: f64) -> ListingRecord {
        ListingRecord {
            code: code.to_string(),
            price: Some(price),
            ..Default::default()
        }
    }

    #[test]
    fn prefers_price_within_tolerance_regardless_of_order() {
        let candidates = vec![
            listing("123-100", 500.0),
            listing("123-100", 980.0),
            listing("123-100", 2000.0),
        ];
        let picked = select_listing(&candidates, Some(980.0)).unwrap();
        assert_eq!(picked.price, Some(980.0));

        let reversed: Vec<_> = candidates.into_iter().rev().collect();
        let picked = select_listing(&reversed, Some(980.0)).unwrap();
        assert_eq!(picked.price, Some(980.0));
    }

    #[test]
    fn sub_yen_difference_still_matches() {
        let candidates = vec![listing("123", 980.5)];
        let picked = select_listing(&candidates, Some(980.0)).unwrap();
        assert_eq!(picked.price, Some(980.5));
    }

    #[test]
    fn falls_back_to_first_candidate_when_nothing_within_tolerance() {
        let candidates = vec![listing("123", 500.0), listing("123", 700.0)];
        let picked = select_listing(&candidates, Some(980.0)).unwrap();
        assert_eq!(picked.price, Some(500.0));
    }

    #[test]
    fn unknown_expected_price_takes_first() {
        let candidates = vec![listing("123", 500.0), listing("123", 300.0)];
        let picked = select_listing(&candidates, None).unwrap();
        assert_eq!(picked.price, Some(500.0));
    }

    #[test]
    fn empty_candidates_is_no_match() {
        assert_eq!(select_listing(&[], Some(980.0)), None);
        assert_eq!(select_listing(&[], None), None);
    }

    #[test]
    fn candidate_without_price_cannot_match_but_can_be_fallback() {
        let candidates = vec![ListingRecord {
            code: "123".to_string(),
            price: None,
            ..Default::default()
        }];
        let picked = select_listing(&candidates, Some(980.0)).unwrap();
        assert_eq!(picked.price, None);
    }
}
