//! Metrics for bulk ingestion and write-hook index sync.

use metrics::{counter, gauge, histogram};

/// Ingestion metrics recorder
pub struct IngestionMetrics;

impl IngestionMetrics {
    /// Per-page counts of profiles read, skipped and upserted.
    pub fn record_page(found: usize, skipped: usize, upserted: usize) {
        counter!("ingestion_profiles_total", "result" => "found").increment(found as u64);
        counter!("ingestion_profiles_total", "result" => "skipped").increment(skipped as u64);
        counter!("ingestion_profiles_total", "result" => "upserted").increment(upserted as u64);
    }

    pub fn record_run_completed(upserted: usize, duration_ms: u64) {
        counter!("ingestion_runs_total", "status" => "success").increment(1);
        histogram!("ingestion_duration_seconds").record(duration_ms as f64 / 1000.0);
        gauge!("ingestion_last_upserted").set(upserted as f64);
    }

    pub fn record_run_failed(duration_ms: u64) {
        counter!("ingestion_runs_total", "status" => "failure").increment(1);
        histogram!("ingestion_duration_seconds").record(duration_ms as f64 / 1000.0);
    }

    /// A single write-hook update; `operation` is `upsert` or `delete`.
    pub fn record_sync(operation: &'static str, success: bool) {
        let status = if success { "success" } else { "failure" };
        counter!(
            "index_sync_operations_total",
            "operation" => operation,
            "status" => status
        )
        .increment(1);
    }
}
