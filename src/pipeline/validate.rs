//! Validation: reject bodies whose byte length equals a known sentinel size.
//!
//! The endpoint has exactly two non-coupon responses, and both are
//! byte-stable: the "coupon not found" page and an empty PDF. Comparing the
//! body length against those two exact sizes is a coarse heuristic, not
//! content inspection — a legitimate coupon that happens to hit one of the
//! exact counts is a false negative, accepted as a known limitation.

/// Returns `true` when `body` looks like a real coupon, i.e. its length
/// matches neither sentinel size.
pub fn is_coupon(body: &[u8], sentinel_lens: (usize, usize)) -> bool {
    let (error_page, blank_pdf) = sentinel_lens;
    body.len() != error_page && body.len() != blank_pdf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BLANK_PDF_LEN, ERROR_PAGE_LEN};

    const SENTINELS: (usize, usize) = (ERROR_PAGE_LEN, BLANK_PDF_LEN);

    #[test]
    fn error_page_length_rejected() {
        assert!(!is_coupon(&vec![0u8; 52286], SENTINELS));
    }

    #[test]
    fn blank_pdf_length_rejected() {
        assert!(!is_coupon(&vec![0u8; 1008], SENTINELS));
    }

    #[test]
    fn other_lengths_accepted() {
        assert!(is_coupon(&[], SENTINELS));
        assert!(is_coupon(&[0u8], SENTINELS));
        assert!(is_coupon(&vec![0u8; 900], SENTINELS));
        assert!(is_coupon(&vec![0u8; 52285], SENTINELS));
        assert!(is_coupon(&vec![0u8; 52287], SENTINELS));
        assert!(is_coupon(&vec![0u8; 1_000_000], SENTINELS));
    }

    #[test]
    fn content_is_ignored_only_length_matters() {
        // A 1008-byte buffer full of plausible PDF bytes is still rejected.
        let mut body = b"%PDF-1.4 ".to_vec();
        body.resize(1008, b'x');
        assert!(!is_coupon(&body, SENTINELS));
    }
}
