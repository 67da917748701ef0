//! CLI binary for couponbook.
//!
//! A thin shim over the library crate that maps CLI flags to `RunConfig`
//! and prints a per-run summary.

use anyhow::{Context, Result};
use clap::Parser;
use couponbook::{run, CouponOutcome, RunConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Try coupon indices 0..19, save valid ones and build coupons.pdf
  couponbook 20

  # Same, but skip coupons whose printed validity date has passed
  couponbook 20 --skip-expired

  # Custom output directory and endpoint
  couponbook 50 -o ~/coupons --base-url https://example.com/coupons/

  # Machine-readable run report
  couponbook 20 --json > report.json

OUTPUTS:
  <output-dir>/couponN.pdf   one file per valid coupon (N = loop index)
  <output-dir>/coupons.pdf   booklet of first pages, ascending index order
  <output-dir>/couponN.txt   pdftotext sidecars (only with --skip-expired)

EXPIRY FILTERING:
  --skip-expired converts each saved coupon to text with pdftotext and looks
  for the validity phrase "Ważny ... do DD.MM.YYYY r.". Coupons dated on or
  before today stay on disk but are not bound into the booklet. pdftotext
  (poppler-utils) must be installed and on PATH.
"#;

/// Download numbered coupon PDFs and bind them into a single booklet.
#[derive(Parser, Debug)]
#[command(
    name = "couponbook",
    version,
    about = "Download numbered coupon PDFs and bind them into a single booklet",
    long_about = "Download coupon PDFs from a numbered endpoint, filter out the endpoint's \
error page and blank responses by their byte-stable sizes, save each real coupon \
individually, and append its first page to a combined booklet. Optionally skip coupons \
whose printed validity date has already passed.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Exclusive upper bound of the coupon index range: indices 0..COUNT are attempted.
    count: u32,

    /// Directory for individual coupons and the booklet.
    #[arg(short, long, env = "COUPONBOOK_OUTPUT_DIR", default_value = "coupons")]
    output_dir: PathBuf,

    /// Base URL the two-digit coupon number is appended to.
    #[arg(long, env = "COUPONBOOK_BASE_URL")]
    base_url: Option<String>,

    /// Skip coupons whose printed validity date has passed (needs pdftotext).
    #[arg(long, env = "COUPONBOOK_SKIP_EXPIRED")]
    skip_expired: bool,

    /// PDF-to-text converter binary used by --skip-expired.
    #[arg(long, env = "COUPONBOOK_PDFTOTEXT", default_value = "pdftotext")]
    pdftotext: String,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "COUPONBOOK_FETCH_TIMEOUT", default_value_t = 120)]
    fetch_timeout: u64,

    /// Print the run report as JSON instead of the human summary.
    #[arg(long, env = "COUPONBOOK_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "COUPONBOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "COUPONBOOK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = RunConfig::builder()
        .count(cli.count)
        .output_dir(&cli.output_dir)
        .skip_expired(cli.skip_expired)
        .pdftotext_bin(&cli.pdftotext)
        .fetch_timeout_secs(cli.fetch_timeout);

    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = run(&config).await.context("Coupon run failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        for report in &output.reports {
            match report.outcome {
                CouponOutcome::Merged => eprintln!(
                    "  {} coupon {:<3} {}",
                    green("✓"),
                    report.index,
                    dim(&format!("{} bytes", report.body_len)),
                ),
                CouponOutcome::Expired => eprintln!(
                    "  {} coupon {:<3} {}",
                    yellow("∅"),
                    report.index,
                    dim("expired, saved but not merged"),
                ),
                CouponOutcome::Filtered => eprintln!(
                    "  {} coupon {:<3} {}",
                    dim("·"),
                    report.index,
                    dim("not a coupon"),
                ),
            }
        }

        eprintln!(
            "{} {}/{} coupons merged  ({} filtered, {} expired)  {}ms",
            green("✔"),
            bold(&output.stats.merged.to_string()),
            output.stats.attempted,
            output.stats.filtered,
            output.stats.expired,
            output.stats.total_duration_ms,
        );
        match output.booklet {
            Some(ref path) => eprintln!("   booklet: {}", bold(&path.display().to_string())),
            None => eprintln!("   no valid coupons; booklet not written"),
        }
    }

    Ok(())
}
