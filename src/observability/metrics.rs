//! Metrics for the catalog layer
//!
//! Recording goes through the `metrics` facade; nothing is exported unless
//! [`init`] installed the Prometheus recorder.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::{CatalogError, Result};

/// Enum representing all metric names used by the catalog layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Upstream metrics
    UpstreamRequestsSuccess,
    UpstreamRequestsError,
    UpstreamRequestDuration,
    UpstreamRecordsReturned,

    // Feed metrics
    FeedItemsEmitted,
    FeedItemsSkipped,

    // Dataset metrics
    OsdrRowsFlattened,
    OsdrDictionaryRows,

    // Selection metrics
    SelectionStored,
    SelectionRejected,
    SelectionFallback,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::UpstreamRequestsSuccess => "astro_upstream_requests_success_total",
            MetricName::UpstreamRequestsError => "astro_upstream_requests_error_total",
            MetricName::UpstreamRequestDuration => "astro_upstream_request_duration_seconds",
            MetricName::UpstreamRecordsReturned => "astro_upstream_records_returned",
            MetricName::FeedItemsEmitted => "astro_feed_items_emitted_total",
            MetricName::FeedItemsSkipped => "astro_feed_items_skipped_total",
            MetricName::OsdrRowsFlattened => "astro_osdr_rows_flattened_total",
            MetricName::OsdrDictionaryRows => "astro_osdr_dictionary_rows_total",
            MetricName::SelectionStored => "astro_selection_stored_total",
            MetricName::SelectionRejected => "astro_selection_rejected_total",
            MetricName::SelectionFallback => "astro_selection_fallback_total",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            UpstreamRequestsSuccess,
            UpstreamRequestsError,
            UpstreamRequestDuration,
            UpstreamRecordsReturned,
            FeedItemsEmitted,
            FeedItemsSkipped,
            OsdrRowsFlattened,
            OsdrDictionaryRows,
            SelectionStored,
            SelectionRejected,
            SelectionFallback,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is a no-op.
pub fn init() -> Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| CatalogError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition, if the recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

// ============================================================================
// Upstream Metrics
// ============================================================================

pub mod upstream {
    use super::MetricName;

    pub fn request_success(records: usize) {
        ::metrics::counter!(MetricName::UpstreamRequestsSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::UpstreamRecordsReturned.as_str()).record(records as f64);
    }

    pub fn request_error(reason: &'static str) {
        ::metrics::counter!(MetricName::UpstreamRequestsError.as_str(), "reason" => reason)
            .increment(1);
    }

    pub fn request_duration(secs: f64) {
        ::metrics::histogram!(MetricName::UpstreamRequestDuration.as_str()).record(secs);
    }
}

// ============================================================================
// Feed Metrics
// ============================================================================

pub mod feed {
    use super::MetricName;

    pub fn items_emitted(count: usize) {
        ::metrics::counter!(MetricName::FeedItemsEmitted.as_str()).increment(count as u64);
    }

    /// Record a raw entry that produced no item
    pub fn item_skipped(reason: &'static str) {
        ::metrics::counter!(MetricName::FeedItemsSkipped.as_str(), "reason" => reason).increment(1);
    }
}

// ============================================================================
// Dataset Metrics
// ============================================================================

pub mod osdr {
    use super::MetricName;

    pub fn rows_flattened(count: usize) {
        ::metrics::counter!(MetricName::OsdrRowsFlattened.as_str()).increment(count as u64);
    }

    pub fn dictionary_rows(count: usize) {
        ::metrics::counter!(MetricName::OsdrDictionaryRows.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Selection Metrics
// ============================================================================

pub mod selection {
    use super::MetricName;

    pub fn stored() {
        ::metrics::counter!(MetricName::SelectionStored.as_str()).increment(1);
    }

    pub fn rejected() {
        ::metrics::counter!(MetricName::SelectionRejected.as_str()).increment(1);
    }

    pub fn fallback_used() {
        ::metrics::counter!(MetricName::SelectionFallback.as_str()).increment(1);
    }
}
