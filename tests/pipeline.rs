//! Integration tests for the coupon pipeline below the fetch stage.
//!
//! `process_coupon` accepts already-fetched bodies, so these tests feed it
//! synthetic responses (sentinel-sized junk and real single-page PDFs built
//! with lopdf) and assert on the files and booklet it produces. No network
//! and no external converter: expiry tests inject a `TextExtractor`.

use chrono::NaiveDate;
use couponbook::testing::MediaBoxPlacement;
use couponbook::{
    process_coupon, run, Booklet, CouponError, CouponOutcome, RunConfig, TextExtractor,
    BLANK_PDF_LEN, ERROR_PAGE_LEN,
};
use lopdf::Document;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Bytes of a minimal one-page PDF whose content stream contains `label`
/// as a literal string.
fn coupon_pdf_bytes(label: &str) -> Vec<u8> {
    let bytes = couponbook::testing::coupon_pdf_bytes(label, MediaBoxPlacement::OnPage);
    assert_ne!(bytes.len(), ERROR_PAGE_LEN, "fixture collided with a sentinel");
    assert_ne!(bytes.len(), BLANK_PDF_LEN, "fixture collided with a sentinel");
    bytes
}

fn test_config(dir: &Path) -> RunConfig {
    RunConfig::builder().output_dir(dir).build().unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
}

/// Extractor returning canned text, so expiry tests need no real converter.
struct StaticText(&'static str);

impl TextExtractor for StaticText {
    fn extract(&self, _path: &Path) -> Result<String, CouponError> {
        Ok(self.0.to_string())
    }
}

/// All page contents of a booklet file, decompressed, in page order.
fn booklet_page_contents(path: &Path) -> Vec<Vec<u8>> {
    let mut doc = Document::load(path).unwrap();
    doc.decompress();
    doc.get_pages()
        .into_iter()
        .map(|(_, page_id)| doc.get_page_content(page_id).unwrap())
        .collect()
}

// ── End-to-end scenario: three indices, only the middle one is a coupon ─────

#[tokio::test]
async fn sentinel_bodies_are_filtered_and_leave_no_trace() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let mut booklet = Booklet::new();

    let bodies: Vec<Vec<u8>> = vec![
        vec![0u8; ERROR_PAGE_LEN],       // index 0: "not found" page
        coupon_pdf_bytes("coupon one"),  // index 1: real coupon
        vec![0u8; BLANK_PDF_LEN],        // index 2: blank PDF
    ];

    let mut outcomes = Vec::new();
    for (index, body) in bodies.into_iter().enumerate() {
        let report = process_coupon(index as u32, body, &config, &mut booklet, None, today())
            .await
            .unwrap();
        outcomes.push(report.outcome);
    }

    assert_eq!(
        outcomes,
        vec![
            CouponOutcome::Filtered,
            CouponOutcome::Merged,
            CouponOutcome::Filtered
        ]
    );

    // Filtered indices produce no individual file.
    assert!(!tmp.path().join("coupon0.pdf").exists());
    assert!(tmp.path().join("coupon1.pdf").exists());
    assert!(!tmp.path().join("coupon2.pdf").exists());

    // The booklet has exactly one page, sourced from index 1.
    let contents = booklet_page_contents(&config.booklet_path());
    assert_eq!(contents.len(), 1);
    assert!(contents[0]
        .windows(b"coupon one".len())
        .any(|w| w == b"coupon one"));
}

#[tokio::test]
async fn booklet_pages_follow_ascending_index_order() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let mut booklet = Booklet::new();

    for (index, label) in [(0u32, "alpha"), (1, "bravo"), (2, "charlie")] {
        process_coupon(
            index,
            coupon_pdf_bytes(label),
            &config,
            &mut booklet,
            None,
            today(),
        )
        .await
        .unwrap();
    }

    let contents = booklet_page_contents(&config.booklet_path());
    assert_eq!(contents.len(), 3);
    for (page, label) in contents.iter().zip(["alpha", "bravo", "charlie"]) {
        assert!(
            page.windows(label.len()).any(|w| w == label.as_bytes()),
            "page out of order: expected {label}"
        );
    }
}

#[tokio::test]
async fn rerun_reproduces_the_same_booklet() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());

    for _ in 0..2 {
        // A fresh accumulator per run: the booklet file is rebuilt from
        // scratch, never read back.
        let mut booklet = Booklet::new();
        for index in 0..2u32 {
            process_coupon(
                index,
                coupon_pdf_bytes("stable"),
                &config,
                &mut booklet,
                None,
                today(),
            )
            .await
            .unwrap();
        }
    }

    assert_eq!(booklet_page_contents(&config.booklet_path()).len(), 2);
}

#[tokio::test]
async fn saved_coupon_bytes_are_verbatim_and_overwritten_on_rerun() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let mut booklet = Booklet::new();

    let first = coupon_pdf_bytes("version one");
    process_coupon(4, first.clone(), &config, &mut booklet, None, today())
        .await
        .unwrap();
    assert_eq!(std::fs::read(config.coupon_path(4)).unwrap(), first);

    let second = coupon_pdf_bytes("version two with a longer label");
    process_coupon(4, second.clone(), &config, &mut booklet, None, today())
        .await
        .unwrap();
    assert_eq!(std::fs::read(config.coupon_path(4)).unwrap(), second);
}

// ── Expiry gate ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn expired_coupon_is_saved_but_never_merged() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let mut booklet = Booklet::new();
    let extractor: Arc<dyn TextExtractor> =
        Arc::new(StaticText("Kupon 10%\nWażny do 01.01.2000 r.\n"));

    let report = process_coupon(
        0,
        coupon_pdf_bytes("old coupon"),
        &config,
        &mut booklet,
        Some(&extractor),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome, CouponOutcome::Expired);
    assert!(tmp.path().join("coupon0.pdf").exists());
    assert!(booklet.is_empty());
    // Nothing merged, so the booklet file was never written.
    assert!(!config.booklet_path().exists());
}

#[tokio::test]
async fn future_dated_coupon_passes_the_gate() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let mut booklet = Booklet::new();
    let extractor: Arc<dyn TextExtractor> =
        Arc::new(StaticText("Ważny w restauracjach do 31.12.2099 r."));

    let report = process_coupon(
        0,
        coupon_pdf_bytes("fresh coupon"),
        &config,
        &mut booklet,
        Some(&extractor),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome, CouponOutcome::Merged);
    assert_eq!(booklet.page_count(), 1);
    assert!(config.booklet_path().exists());
}

#[tokio::test]
async fn missing_expiry_phrase_aborts_the_run() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let mut booklet = Booklet::new();
    let extractor: Arc<dyn TextExtractor> =
        Arc::new(StaticText("reworded page with no recognisable date"));

    let err = process_coupon(
        0,
        coupon_pdf_bytes("unknown validity"),
        &config,
        &mut booklet,
        Some(&extractor),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CouponError::ExpiryPhraseMissing { .. }));
    // The coupon file was written before the gate ran; it stays on disk.
    assert!(tmp.path().join("coupon0.pdf").exists());
    assert!(booklet.is_empty());
}

// ── Full run against a local endpoint ────────────────────────────────────────

/// Serve `bodies[i]` for the request path `/0i`, recording each path seen.
///
/// A hand-rolled responder is all the run loop needs: one GET per connection,
/// answered from the canned body for that index.
async fn serve_coupons(listener: TcpListener, bodies: Vec<Vec<u8>>, log: Arc<Mutex<Vec<String>>>) {
    loop {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let mut buf = vec![0u8; 4096];
        let mut read = 0;
        // Read until the end of the request headers.
        while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf[read..]).await {
                Ok(0) | Err(_) => break,
                Ok(n) => read += n,
            }
        }
        let request = String::from_utf8_lossy(&buf[..read]).into_owned();
        let path = request
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string();
        let index: usize = path.trim_start_matches('/').parse().unwrap_or(usize::MAX);
        log.lock().unwrap().push(path);

        let body = bodies.get(index).cloned().unwrap_or_default();
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(head.as_bytes()).await;
        let _ = stream.write_all(&body).await;
        let _ = stream.shutdown().await;
    }
}

#[tokio::test]
async fn run_fetches_every_index_once_in_order() {
    let bodies = vec![
        vec![0u8; ERROR_PAGE_LEN],      // index 0: "not found" page
        coupon_pdf_bytes("coupon one"), // index 1: the only real coupon
        vec![0u8; BLANK_PDF_LEN],       // index 2: blank PDF
    ];

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let server = tokio::spawn(serve_coupons(listener, bodies, Arc::clone(&log)));

    let tmp = TempDir::new().unwrap();
    // Nonexistent subdirectory: the run has to create it itself.
    let output_dir = tmp.path().join("coupons");
    let config = RunConfig::builder()
        .count(3)
        .base_url(format!("http://{addr}/"))
        .output_dir(&output_dir)
        .build()
        .unwrap();

    let output = run(&config).await.unwrap();
    server.abort();

    // Every index requested exactly once, ascending, two-digit zero-padded.
    assert_eq!(*log.lock().unwrap(), vec!["/00", "/01", "/02"]);

    assert_eq!(output.stats.attempted, 3);
    assert_eq!(output.stats.filtered, 2);
    assert_eq!(output.stats.merged, 1);
    assert_eq!(output.stats.expired, 0);
    assert_eq!(output.booklet.as_deref(), Some(config.booklet_path().as_path()));

    assert!(output_dir.join("coupon1.pdf").exists());
    assert_eq!(booklet_page_contents(&config.booklet_path()).len(), 1);
}
