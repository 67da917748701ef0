//! Run orchestration: the fetch → validate → persist → merge loop.
//!
//! ## Why strictly sequential?
//!
//! Each coupon index is processed to completion before the next one starts.
//! The endpoint is small and the booklet is rewritten after every accepted
//! coupon, so there is nothing to gain from overlapping requests — and the
//! ascending-index page order falls straight out of the loop with no sorting
//! or coordination.

use crate::config::RunConfig;
use crate::error::CouponError;
use crate::output::{CouponOutcome, CouponReport, RunOutput};
use crate::pipeline::expiry::{self, PdftotextExtractor, TextExtractor};
use crate::pipeline::merge::Booklet;
use crate::pipeline::{fetch, persist, validate};
use chrono::{Local, NaiveDate};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Download coupons 0..count and bind the accepted ones into a booklet.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(CouponError)` on the first fatal failure: network, file I/O,
/// PDF parsing, text extraction, or expiry parsing. Coupons already saved
/// before the failure remain on disk, as does the booklet as of the last
/// accepted coupon. Sentinel-length bodies are not errors; they are recorded
/// as filtered outcomes and the loop continues.
pub async fn run(config: &RunConfig) -> Result<RunOutput, CouponError> {
    let start = Instant::now();
    info!(
        "Starting run: {} indices against {}",
        config.count, config.base_url
    );

    persist::prepare_output_dir(&config.output_dir).await?;
    let client = fetch::build_client(config.fetch_timeout_secs)?;
    let extractor = config.skip_expired.then(|| resolve_extractor(config));
    let today = Local::now().date_naive();

    let mut booklet = Booklet::new();
    let mut reports = Vec::with_capacity(config.count as usize);

    for index in 0..config.count {
        let body =
            fetch::fetch_coupon(&client, &config.base_url, index, config.fetch_timeout_secs)
                .await?;
        let report =
            process_coupon(index, body, config, &mut booklet, extractor.as_ref(), today).await?;
        match report.outcome {
            CouponOutcome::Filtered => debug!("Coupon {index}: filtered"),
            CouponOutcome::Expired => info!("Coupon {index}: expired, saved but not merged"),
            CouponOutcome::Merged => info!(
                "Coupon {index}: merged as booklet page {}",
                booklet.page_count()
            ),
        }
        reports.push(report);
    }

    let booklet_path = (!booklet.is_empty()).then(|| config.booklet_path());
    let output =
        RunOutput::from_reports(reports, booklet_path, start.elapsed().as_millis() as u64);
    info!(
        "Run complete: {}/{} coupons merged, {} filtered, {} expired, {}ms",
        output.stats.merged,
        output.stats.attempted,
        output.stats.filtered,
        output.stats.expired,
        output.stats.total_duration_ms
    );
    Ok(output)
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(config: &RunConfig) -> Result<RunOutput, CouponError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CouponError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(run(config))
}

/// Push one already-fetched coupon body through validate → persist →
/// (optional expiry gate) → merge.
///
/// [`run`] calls this once per index; it is public so callers with bodies
/// from another source (tests, replayed captures) can reuse the pipeline
/// below the fetch stage. The booklet file is rewritten in full after every
/// merged coupon.
pub async fn process_coupon(
    index: u32,
    body: Vec<u8>,
    config: &RunConfig,
    booklet: &mut Booklet,
    extractor: Option<&Arc<dyn TextExtractor>>,
    today: NaiveDate,
) -> Result<CouponReport, CouponError> {
    let body_len = body.len();

    if !validate::is_coupon(&body, config.sentinel_lens) {
        debug!("Coupon {index}: body length {body_len} matches a sentinel size");
        return Ok(CouponReport {
            index,
            body_len,
            outcome: CouponOutcome::Filtered,
            path: None,
        });
    }

    let path = config.coupon_path(index);
    persist::write_coupon(&path, &body).await?;

    if let Some(extractor) = extractor {
        let text = extract_text(extractor, &path).await?;
        if !expiry::is_still_valid(&text, &path, today)? {
            return Ok(CouponReport {
                index,
                body_len,
                outcome: CouponOutcome::Expired,
                path: Some(path),
            });
        }
    }

    booklet.append_first_page(&path)?;
    booklet.save(&config.booklet_path())?;

    Ok(CouponReport {
        index,
        body_len,
        outcome: CouponOutcome::Merged,
        path: Some(path),
    })
}

/// Run the extractor off the async executor's hot path; the converter is an
/// external process that can block for the whole conversion.
async fn extract_text(
    extractor: &Arc<dyn TextExtractor>,
    path: &Path,
) -> Result<String, CouponError> {
    let extractor = Arc::clone(extractor);
    let path_buf = path.to_path_buf();
    tokio::task::spawn_blocking(move || extractor.extract(&path_buf))
        .await
        .map_err(|e| CouponError::Internal(format!("text extraction task failed: {e}")))?
}

/// Use the pre-built extractor when the caller injected one, otherwise shell
/// out to the configured converter binary.
fn resolve_extractor(config: &RunConfig) -> Arc<dyn TextExtractor> {
    match &config.extractor {
        Some(extractor) => Arc::clone(extractor),
        None => Arc::new(PdftotextExtractor::new(config.pdftotext_bin.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticText(&'static str);

    impl TextExtractor for StaticText {
        fn extract(&self, _path: &Path) -> Result<String, CouponError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn injected_extractor_wins_over_binary() {
        let config = RunConfig::builder()
            .skip_expired(true)
            .extractor(Arc::new(StaticText("do 31.12.2099 r.")))
            .pdftotext_bin("should-not-be-invoked")
            .build()
            .unwrap();
        let extractor = resolve_extractor(&config);
        let text = extractor.extract(Path::new("x.pdf")).unwrap();
        assert!(text.contains("2099"));
    }
}
