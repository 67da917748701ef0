//! Run results: per-coupon reports and aggregate statistics.
//!
//! A run never reports partial per-coupon errors — any fatal failure aborts
//! the whole run (see [`crate::error::CouponError`]). What *is* reported is
//! the fate of every attempted index: filtered by the sentinel check, saved
//! and merged, or saved but withheld from the booklet because it expired.

use serde::Serialize;
use std::path::PathBuf;

/// What happened to one coupon index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponOutcome {
    /// Body length matched a sentinel size: no file written, no page merged.
    Filtered,
    /// Saved as an individual file and appended to the booklet.
    Merged,
    /// Saved as an individual file, but its validity date has passed, so it
    /// never entered the booklet.
    Expired,
}

/// Report for one attempted coupon index.
#[derive(Debug, Clone, Serialize)]
pub struct CouponReport {
    /// Coupon index (0-based loop index).
    pub index: u32,
    /// Response body length in bytes, as seen by the validator.
    pub body_len: usize,
    /// Fate of this index.
    pub outcome: CouponOutcome,
    /// Path of the saved file; `None` when the coupon was filtered.
    pub path: Option<PathBuf>,
}

/// Aggregate statistics for a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Number of indices attempted (equals the configured count).
    pub attempted: usize,
    /// Indices rejected by the sentinel-length check.
    pub filtered: usize,
    /// Coupons saved as individual files (merged + expired).
    pub saved: usize,
    /// Saved coupons withheld from the booklet by the expiry filter.
    pub expired: usize,
    /// Pages in the final booklet.
    pub merged: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub total_duration_ms: u64,
}

/// Complete result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// One report per attempted index, in ascending index order.
    pub reports: Vec<CouponReport>,
    /// Aggregate counters.
    pub stats: RunStats,
    /// Path of the combined booklet, `None` when no coupon was merged
    /// (the booklet file is only written once at least one page exists).
    pub booklet: Option<PathBuf>,
}

impl RunOutput {
    /// Compute aggregate counters from the collected reports.
    pub(crate) fn from_reports(
        reports: Vec<CouponReport>,
        booklet: Option<PathBuf>,
        total_duration_ms: u64,
    ) -> Self {
        let stats = RunStats {
            attempted: reports.len(),
            filtered: reports
                .iter()
                .filter(|r| r.outcome == CouponOutcome::Filtered)
                .count(),
            saved: reports
                .iter()
                .filter(|r| r.outcome != CouponOutcome::Filtered)
                .count(),
            expired: reports
                .iter()
                .filter(|r| r.outcome == CouponOutcome::Expired)
                .count(),
            merged: reports
                .iter()
                .filter(|r| r.outcome == CouponOutcome::Merged)
                .count(),
            total_duration_ms,
        };
        Self {
            reports,
            stats,
            booklet,
        }
    }
}
