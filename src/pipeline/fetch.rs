//! Fetching: build a coupon URL from an index and GET the raw body.
//!
//! ## Why no status-code check?
//!
//! The endpoint serves its "coupon not found" page with a success status, so
//! HTTP status carries no signal here. The only validity contract is the body
//! length checked by [`crate::pipeline::validate`]. Network-level failures
//! (DNS, connect, timeout) are fatal and terminate the run — there is no
//! retry, matching the endpoint's one-shot usage pattern.

use crate::error::CouponError;
use std::time::Duration;
use tracing::debug;

/// Build the URL for coupon `index`.
///
/// The endpoint addresses coupons by a two-digit zero-padded decimal path
/// segment appended directly to the base URL: index 3 → `<base>03`.
pub fn coupon_url(base_url: &str, index: u32) -> String {
    format!("{base_url}{index:02}")
}

/// Build the shared HTTP client used for the whole run.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, CouponError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(CouponError::ClientBuildFailed)
}

/// GET the body bytes for coupon `index`.
pub async fn fetch_coupon(
    client: &reqwest::Client,
    base_url: &str,
    index: u32,
    timeout_secs: u64,
) -> Result<Vec<u8>, CouponError> {
    let url = coupon_url(base_url, index);
    debug!("Fetching coupon {} from {}", index, url);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| map_fetch_err(&url, timeout_secs, e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_fetch_err(&url, timeout_secs, e))?;

    debug!("Coupon {}: {} bytes", index, bytes.len());
    Ok(bytes.to_vec())
}

/// Classify a transport error: timeouts get their own variant so the CLI can
/// point at the `--fetch-timeout` knob, everything else is a generic failure.
fn map_fetch_err(url: &str, secs: u64, e: reqwest::Error) -> CouponError {
    if e.is_timeout() {
        CouponError::FetchTimeout {
            url: url.to_string(),
            secs,
        }
    } else {
        CouponError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_zero_padded_to_two_digits() {
        let base = "https://example.com/coupons/";
        assert_eq!(coupon_url(base, 0), "https://example.com/coupons/00");
        assert_eq!(coupon_url(base, 7), "https://example.com/coupons/07");
        assert_eq!(coupon_url(base, 42), "https://example.com/coupons/42");
    }

    #[test]
    fn three_digit_index_is_not_truncated() {
        // Padding is a minimum width; larger indices pass through unchanged.
        assert_eq!(coupon_url("x/", 123), "x/123");
    }

    #[tokio::test]
    async fn connection_refused_maps_to_fetch_failed() {
        // Bind to grab a free port, then drop the listener so nothing answers.
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let client = build_client(5).unwrap();
        let err = fetch_coupon(&client, &format!("http://{addr}/"), 0, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CouponError::FetchFailed { .. }));
    }
}
