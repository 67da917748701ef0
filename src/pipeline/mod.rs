//! Pipeline stages for coupon download and booklet assembly.
//!
//! Each submodule implements exactly one step of the per-coupon pipeline.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. inject a fake text extractor in tests) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ validate ──▶ persist ──▶ [expiry] ──▶ merge
//! (HTTP GET)  (sentinel)  (couponN.pdf)  (gate)   (booklet)
//! ```
//!
//! 1. [`fetch`]    — build the coupon URL from an index and GET the body
//! 2. [`validate`] — reject bodies whose length equals a sentinel size
//! 3. [`persist`]  — write the individual coupon file (and create the
//!    output directory once, before the loop)
//! 4. [`expiry`]   — optional gate: extract text, find the validity date,
//!    compare against today
//! 5. [`merge`]    — append the coupon's first page to the booklet and
//!    rewrite the booklet file in full

pub mod expiry;
pub mod fetch;
pub mod merge;
pub mod persist;
pub mod validate;
