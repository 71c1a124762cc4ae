//! Metrics for the recommendation read path.

use metrics::{counter, histogram};
use std::time::Duration;

/// Recommendation metrics recorder
pub struct RecommendationMetrics;

impl RecommendationMetrics {
    /// A request completed and returned `count` results.
    pub fn record_served(count: usize, duration_ms: u64) {
        counter!("recommendation_requests_total", "outcome" => "ok").increment(1);
        histogram!("recommendation_duration_seconds").record(duration_ms as f64 / 1000.0);
        histogram!("recommendation_results").record(count as f64);

        tracing::debug!(count, duration_ms, "Served recommendations");
    }

    /// A request failed; `kind` is the error kind label (e.g. `profile_not_found`).
    pub fn record_failed(kind: &'static str) {
        counter!("recommendation_requests_total", "outcome" => kind).increment(1);
    }

    /// Index hits dropped during post-processing.
    ///
    /// `reason` is one of `self`, `missing_distance`, `duplicate`, `malformed`.
    pub fn record_dropped(reason: &'static str, count: usize) {
        if count > 0 {
            counter!("recommendation_hits_dropped_total", "reason" => reason)
                .increment(count as u64);
        }
    }

    /// Time spent embedding `batch` texts on the given path (`query` or `ingest`).
    pub fn record_embedding(path: &'static str, batch: usize, elapsed: Duration) {
        histogram!("embedding_duration_seconds", "path" => path).record(elapsed.as_secs_f64());
        tracing::trace!(path, batch, elapsed_ms = elapsed.as_millis() as u64, "Embedded texts");
    }
}
