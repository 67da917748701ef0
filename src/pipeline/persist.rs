//! Persistence: the output directory and individual coupon files.
//!
//! Directory creation happens once, before the download loop. `AlreadyExists`
//! is success — re-running into the same directory is the normal case — while
//! every other error kind (permissions, missing parent, read-only filesystem)
//! propagates. This is an explicit branch on the error kind, not a blanket
//! suppression of all creation failures.

use crate::error::CouponError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Ensure the output directory exists.
pub async fn prepare_output_dir(dir: &Path) -> Result<(), CouponError> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => {
            debug!("Created output directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(CouponError::OutputDirFailed {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Write a validated coupon body to `path`, overwriting any existing file.
pub async fn write_coupon(path: &Path, body: &[u8]) -> Result<(), CouponError> {
    tokio::fs::write(path, body)
        .await
        .map_err(|e| CouponError::CouponWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!("Wrote {} bytes to {}", body.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn prepare_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("coupons");
        prepare_output_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        // Second call hits the existing directory and still succeeds.
        prepare_output_dir(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn writes_bytes_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("coupon3.pdf");
        let body = b"%PDF-1.4 fake coupon body";
        write_coupon(&path, body).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), body);
    }

    #[tokio::test]
    async fn rerun_overwrites_prior_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("coupon0.pdf");
        write_coupon(&path, b"first version").await.unwrap();
        write_coupon(&path, b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }
}
