//! Prometheus metrics for the processing pipeline.
//!
//! This module provides metrics for:
//! - Batches (result, duration)
//! - Staging (files downloaded, files missing at cleanup)
//! - Publishing (artifacts uploaded, bytes)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batches processed total by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flexprep_batches_total", "Total batches processed"),
        &["result"], // "success", "selection_failed", "download_failed", ...
    )
    .unwrap()
});

/// Batch processing duration in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flexprep_batch_duration_seconds",
            "Duration of one processing invocation",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Staging Metrics
// =============================================================================

/// Input files staged total.
pub static FILES_STAGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("flexprep_files_staged_total", "Total input files staged").unwrap()
});

/// Staged files already missing when cleanup ran.
pub static STAGED_FILES_MISSING: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flexprep_staged_files_missing_total",
        "Staged input files that were already gone at cleanup",
    )
    .unwrap()
});

// =============================================================================
// Publishing Metrics
// =============================================================================

/// Artifacts uploaded total.
pub static ARTIFACTS_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flexprep_artifacts_uploaded_total",
        "Total preprocessed artifacts uploaded",
    )
    .unwrap()
});

/// Bytes uploaded total.
pub static BYTES_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("flexprep_bytes_uploaded_total", "Total artifact bytes uploaded").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Batches
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_DURATION.clone()),
        // Staging
        Box::new(FILES_STAGED.clone()),
        Box::new(STAGED_FILES_MISSING.clone()),
        // Publishing
        Box::new(ARTIFACTS_UPLOADED.clone()),
        Box::new(BYTES_UPLOADED.clone()),
    ]
}
