//! Service counters, exported in Prometheus text format on `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Enum representing all metric names used by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricName {
    QueriesTotal,
    QueryValidationErrors,
    QueryFallbacks,
    QueryFailures,
    CacheHits,
    CacheMisses,
    RefreshesStarted,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::QueriesTotal => "psyfinder_queries_total",
            MetricName::QueryValidationErrors => "psyfinder_query_validation_errors_total",
            MetricName::QueryFallbacks => "psyfinder_query_fallbacks_total",
            MetricName::QueryFailures => "psyfinder_query_failures_total",
            MetricName::CacheHits => "psyfinder_cache_hits_total",
            MetricName::CacheMisses => "psyfinder_cache_misses_total",
            MetricName::RefreshesStarted => "psyfinder_refreshes_started_total",
        }
    }
}

/// Install the Prometheus recorder. Idempotent; a second call (or a
/// recorder installed elsewhere) leaves the first one in place.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_ok() {
                info!("Prometheus recorder installed");
            }
        }
        Err(e) => warn!("Prometheus recorder not installed: {}", e),
    }
}

/// Current exposition text, empty when no recorder is installed.
pub fn render() -> String {
    HANDLE.get().map(PrometheusHandle::render).unwrap_or_default()
}

pub fn record_query(source: &str) {
    metrics::counter!(MetricName::QueriesTotal.as_str(), "source" => source.to_string()).increment(1);
}

pub fn record_validation_error() {
    metrics::counter!(MetricName::QueryValidationErrors.as_str()).increment(1);
}

pub fn record_fallback(source: &str) {
    metrics::counter!(MetricName::QueryFallbacks.as_str(), "source" => source.to_string()).increment(1);
}

pub fn record_failure(source: &str) {
    metrics::counter!(MetricName::QueryFailures.as_str(), "source" => source.to_string()).increment(1);
}

pub fn record_cache(source: &str, hit: bool) {
    let name = if hit {
        MetricName::CacheHits
    } else {
        MetricName::CacheMisses
    };
    metrics::counter!(name.as_str(), "source" => source.to_string()).increment(1);
}

pub fn record_refresh_started() {
    metrics::counter!(MetricName::RefreshesStarted.as_str()).increment(1);
}
