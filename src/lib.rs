//! # couponbook
//!
//! Download numbered coupon PDFs from a fixed endpoint and bind the valid,
//! unexpired ones into a single multi-page booklet.
//!
//! ## How validity works
//!
//! The endpoint answers every index, real coupon or not: misses get a
//! byte-stable "not found" page (52286 bytes) or an empty PDF (1008 bytes).
//! Comparing the body length against those two sentinel sizes is the entire
//! validity check — coarse, but it is the only signal the endpoint offers.
//!
//! ## Pipeline Overview
//!
//! ```text
//! index 0..N
//!  │
//!  ├─ 1. Fetch     GET <base-url><NN>  (two-digit zero-padded index)
//!  ├─ 2. Validate  reject sentinel byte lengths (error page / blank PDF)
//!  ├─ 3. Persist   write couponN.pdf  (overwrite, directory created once)
//!  ├─ 4. Expiry    optional gate: pdftotext → "do DD.MM.YYYY r." → chrono
//!  └─ 5. Merge     append first page to the booklet, rewrite coupons.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use couponbook::{run, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder()
//!         .count(20)
//!         .output_dir("coupons")
//!         .skip_expired(true)
//!         .build()?;
//!     let output = run(&config).await?;
//!     println!(
//!         "{} merged, {} filtered, {} expired",
//!         output.stats.merged, output.stats.filtered, output.stats.expired
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `couponbook` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! couponbook = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod run;

#[doc(hidden)]
pub mod testing;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    RunConfig, RunConfigBuilder, BLANK_PDF_LEN, DEFAULT_BASE_URL, DEFAULT_BOOKLET_NAME,
    ERROR_PAGE_LEN,
};
pub use error::CouponError;
pub use output::{CouponOutcome, CouponReport, RunOutput, RunStats};
pub use pipeline::expiry::{PdftotextExtractor, TextExtractor};
pub use pipeline::merge::Booklet;
pub use run::{process_coupon, run, run_sync};
