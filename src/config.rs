//! Configuration for a coupon download run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share configs, log them, and diff two runs to understand why their outputs
//! differ.
//!
//! Every default matches the constants of the original coupon endpoint, so
//! `RunConfig::builder().count(n).build()` reproduces a stock run exactly.

use crate::error::CouponError;
use crate::pipeline::expiry::TextExtractor;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Byte length of the endpoint's "coupon not found" page.
pub const ERROR_PAGE_LEN: usize = 52286;

/// Byte length of the endpoint's empty PDF response.
pub const BLANK_PDF_LEN: usize = 1008;

/// Default coupon endpoint. The two-digit coupon number is appended directly.
pub const DEFAULT_BASE_URL: &str = "https://dlaciebie.sodexo.pl/ekupony/drukuj/id/";

/// File name of the combined booklet inside the output directory.
pub const DEFAULT_BOOKLET_NAME: &str = "coupons.pdf";

/// Configuration for one coupon download run.
///
/// Built via [`RunConfig::builder()`].
///
/// # Example
/// ```rust
/// use couponbook::RunConfig;
///
/// let config = RunConfig::builder()
///     .count(20)
///     .output_dir("coupons")
///     .skip_expired(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Exclusive upper bound of the coupon index range: indices 0..count are attempted.
    pub count: u32,

    /// Base URL the two-digit coupon number is appended to.
    pub base_url: String,

    /// Directory receiving `couponN.pdf` files and the booklet. Created if missing.
    pub output_dir: PathBuf,

    /// File name of the combined booklet inside `output_dir`.
    pub booklet_name: String,

    /// Exact body lengths rejected by the validator: (error page, blank PDF).
    ///
    /// A coarse heuristic, not content inspection. A legitimate coupon that
    /// happens to hit one of these exact byte counts is silently dropped —
    /// accepted as a known limitation of the size-based check.
    pub sentinel_lens: (usize, usize),

    /// Enable the expiry filter: coupons whose printed validity date has
    /// passed are saved individually but never enter the booklet.
    pub skip_expired: bool,

    /// Pre-constructed text extractor used by the expiry filter. Takes
    /// precedence over `pdftotext_bin`. Mainly useful in tests, where an
    /// injected extractor avoids shelling out to a real converter.
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Binary name or path of the PDF-to-text converter.
    pub pdftotext_bin: String,

    /// Per-request HTTP timeout in seconds. Default: 120.
    pub fetch_timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: 0,
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("coupons"),
            booklet_name: DEFAULT_BOOKLET_NAME.to_string(),
            sentinel_lens: (ERROR_PAGE_LEN, BLANK_PDF_LEN),
            skip_expired: false,
            extractor: None,
            pdftotext_bin: "pdftotext".to_string(),
            fetch_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("count", &self.count)
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("booklet_name", &self.booklet_name)
            .field("sentinel_lens", &self.sentinel_lens)
            .field("skip_expired", &self.skip_expired)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field("pdftotext_bin", &self.pdftotext_bin)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full path of the combined booklet.
    pub fn booklet_path(&self) -> PathBuf {
        self.output_dir.join(&self.booklet_name)
    }

    /// Full path of the individual file for coupon `index`.
    pub fn coupon_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!("coupon{index}.pdf"))
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn count(mut self, n: u32) -> Self {
        self.config.count = n;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn booklet_name(mut self, name: impl Into<String>) -> Self {
        self.config.booklet_name = name.into();
        self
    }

    pub fn sentinel_lens(mut self, error_page: usize, blank_pdf: usize) -> Self {
        self.config.sentinel_lens = (error_page, blank_pdf);
        self
    }

    pub fn skip_expired(mut self, v: bool) -> Self {
        self.config.skip_expired = v;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn pdftotext_bin(mut self, bin: impl Into<String>) -> Self {
        self.config.pdftotext_bin = bin.into();
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, CouponError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(CouponError::InvalidConfig("base_url must not be empty".into()));
        }
        if c.booklet_name.is_empty() {
            return Err(CouponError::InvalidConfig(
                "booklet_name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
