//! Observability utilities for the OnlyFriends recommendation services.
//!
//! - Prometheus recorder installation and the `/metrics` handler
//! - Axum middleware recording per-route request metrics
//! - Domain recorders for the recommendation and ingestion paths
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, RecommendationMetrics};
//!
//! init_metrics()?;
//! RecommendationMetrics::record_served(5, 12);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod ingestion;
pub mod middleware;
pub mod recommendations;

pub use ingestion::IngestionMetrics;
pub use middleware::metrics_middleware;
pub use recommendations::RecommendationMetrics;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Call once at startup; later calls return
/// the existing handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // HTTP
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Recommendations
    describe_counter!(
        "recommendation_requests_total",
        "Recommendation requests by outcome"
    );
    describe_histogram!(
        "recommendation_duration_seconds",
        "End-to-end recommendation latency in seconds"
    );
    describe_histogram!(
        "recommendation_results",
        "Number of recommendations returned per request"
    );
    describe_counter!(
        "recommendation_hits_dropped_total",
        "Index hits discarded during post-processing, by reason"
    );
    describe_histogram!(
        "embedding_duration_seconds",
        "Time spent computing embeddings, by path"
    );

    // Ingestion
    describe_counter!(
        "ingestion_profiles_total",
        "Profiles seen by bulk ingestion, by result"
    );
    describe_counter!("ingestion_runs_total", "Bulk ingestion runs by status");
    describe_histogram!(
        "ingestion_duration_seconds",
        "Bulk ingestion run duration in seconds"
    );
    describe_gauge!(
        "ingestion_last_upserted",
        "Entries upserted by the most recent ingestion run"
    );
    describe_counter!(
        "index_sync_operations_total",
        "Write-hook index updates by operation and status"
    );
}
