//! Error types for the couponbook library.
//!
//! One enum covers every fatal failure. There is deliberately no non-fatal
//! error type: a coupon whose body matches a sentinel byte length is not an
//! error at all (it is recorded as a filtered [`crate::output::CouponOutcome`]
//! and the run continues), while everything else — network, file I/O, PDF
//! parsing, text extraction, expiry parsing — aborts the run. Already-saved
//! coupon files stay on disk; only the booklet for the aborted invocation is
//! lost.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the couponbook library.
#[derive(Debug, Error)]
pub enum CouponError {
    // ── Setup errors ──────────────────────────────────────────────────────
    /// Output directory could not be created (any kind other than AlreadyExists).
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildFailed(reqwest::Error),

    /// GET request for a coupon failed.
    #[error("Failed to fetch '{url}': {reason}\nCheck your internet connection.")]
    FetchFailed { url: String, reason: String },

    /// GET request exceeded the configured timeout.
    #[error("Fetch timed out after {secs}s for '{url}'\nIncrease --fetch-timeout.")]
    FetchTimeout { url: String, secs: u64 },

    // ── Persistence errors ────────────────────────────────────────────────
    /// Could not write an individual coupon file.
    #[error("Failed to write coupon file '{path}': {source}")]
    CouponWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not serialize the booklet to disk.
    #[error("Failed to write booklet '{path}': {detail}")]
    BookletWriteFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// A saved coupon could not be parsed as a PDF.
    #[error("Coupon PDF '{path}' could not be parsed: {source}\nThe sentinel length check may have let a non-PDF response through.")]
    PdfParseFailed {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// A parsed coupon contains no pages, so there is nothing to merge.
    #[error("Coupon PDF '{path}' has no pages")]
    EmptyCoupon { path: PathBuf },

    // ── Expiry-filter errors ──────────────────────────────────────────────
    /// The external text converter failed (missing binary, spawn error, or
    /// non-zero exit status).
    #[error("Text extraction failed for '{path}': {detail}\nIs pdftotext installed and on PATH?")]
    TextExtractionFailed { path: PathBuf, detail: String },

    /// The extracted text contains no recognisable validity phrase.
    #[error("No expiry phrase found in text of '{path}'\nThe pattern is bound to the Polish \"Ważny do DD.MM.YYYY r.\" phrasing; a wording change breaks it.")]
    ExpiryPhraseMissing { path: PathBuf },

    /// The extracted date substring did not parse as day.month.year.
    #[error("Expiry date '{raw}' is not a valid DD.MM.YYYY date: {source}")]
    ExpiryDateInvalid {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
