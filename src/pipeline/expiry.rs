//! Expiry filtering: extract a coupon's printed validity date and compare it
//! against today.
//!
//! ## Why a trait for text extraction?
//!
//! The production path shells out to `pdftotext`, which makes the whole gate
//! untestable without the binary installed. Putting the conversion behind
//! [`TextExtractor`] lets tests inject text directly and keeps the date logic
//! ([`expiry_date`], [`is_still_valid`]) pure.
//!
//! ## Known fragility
//!
//! The date is located with a fixed pattern tuned to the endpoint's Polish
//! phrasing, `Ważny ... do DD.MM.YYYY r.` — keyed on the `do <date> r.` tail.
//! Any change in that wording makes the pattern miss, which surfaces as
//! [`CouponError::ExpiryPhraseMissing`] and aborts the run. A diagnosable
//! hard failure was chosen over silently merging coupons of unknown validity.

use crate::error::CouponError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Produces the plain-text rendition of a PDF file.
pub trait TextExtractor: Send + Sync {
    /// Extract text from the PDF at `path`.
    fn extract(&self, path: &Path) -> Result<String, CouponError>;
}

/// Production extractor: shells out to `pdftotext <pdf> <txt>`.
///
/// The converter's stdout and stderr are discarded; only its exit status is
/// inspected. The sidecar text file is written next to the coupon (same stem,
/// `.txt` extension) and left on disk after reading.
pub struct PdftotextExtractor {
    bin: String,
}

impl PdftotextExtractor {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl TextExtractor for PdftotextExtractor {
    fn extract(&self, path: &Path) -> Result<String, CouponError> {
        let sidecar = path.with_extension("txt");
        debug!(
            "Converting {} to text via {}",
            path.display(),
            self.bin
        );

        let status = Command::new(&self.bin)
            .arg(path)
            .arg(&sidecar)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| CouponError::TextExtractionFailed {
                path: path.to_path_buf(),
                detail: format!("failed to run '{}': {}", self.bin, e),
            })?;

        if !status.success() {
            return Err(CouponError::TextExtractionFailed {
                path: path.to_path_buf(),
                detail: format!("'{}' exited with {}", self.bin, status),
            });
        }

        let bytes =
            std::fs::read(&sidecar).map_err(|e| CouponError::TextExtractionFailed {
                path: path.to_path_buf(),
                detail: format!("failed to read sidecar '{}': {}", sidecar.display(), e),
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Locates the validity date in the converter output. Tuned to the Polish
/// `Ważny ... do DD.MM.YYYY r.` phrase; the capture is the date substring.
static RE_VALID_UNTIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"do\s+(\d{1,2}\.\d{1,2}\.\d{4})\s*r\.").unwrap());

/// Extract the coupon's expiry date from its plain-text rendition.
///
/// `path` is only used for error context.
pub fn expiry_date(text: &str, path: &Path) -> Result<NaiveDate, CouponError> {
    let caps = RE_VALID_UNTIL
        .captures(text)
        .ok_or_else(|| CouponError::ExpiryPhraseMissing {
            path: path.to_path_buf(),
        })?;
    let raw = &caps[1];
    NaiveDate::parse_from_str(raw, "%d.%m.%Y").map_err(|e| CouponError::ExpiryDateInvalid {
        raw: raw.to_string(),
        source: e,
    })
}

/// Returns `true` when the coupon is still valid: its printed expiry date is
/// strictly after `today`. A coupon expiring today is already expired.
pub fn is_still_valid(text: &str, path: &Path, today: NaiveDate) -> Result<bool, CouponError> {
    let expiry = expiry_date(text, path)?;
    debug!("Expiry date {} vs today {}", expiry, today);
    Ok(expiry > today)
}
