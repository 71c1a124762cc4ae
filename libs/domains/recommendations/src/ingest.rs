use database::common::{RetryConfig, retry_when};
use domain_profiles::{ProfileRecord, ProfileStore, profile_pages};
use futures::TryStreamExt;
use observability::{IngestionMetrics, RecommendationMetrics};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::embedding::{EmbeddingProvider, ensure_dimension};
use crate::error::{RecommendationError, RecommendationResult};
use crate::index::VectorIndex;
use crate::models::{EntryPayload, IndexEntry, IngestionReport};
use crate::text::canonical_text;

/// Backfills the index from the profile store.
///
/// Walks the store page by page, so memory is bounded by the batch size.
/// Entries are keyed by username, so running the job again over an unchanged
/// store rewrites the same entries.
pub struct IngestionJob {
    store: Arc<dyn ProfileStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
    retry: RetryConfig,
}

impl IngestionJob {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            batch_size,
            retry: RetryConfig::default(),
        }
    }

    /// Backoff for transient embedding and index failures within a page
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Ingests every profile in the store.
    ///
    /// Incomplete records are skipped and counted. Store, embedding and index
    /// failures abort the run; entries written before the failure stay.
    #[instrument(skip(self), fields(batch_size = self.batch_size))]
    pub async fn run(&self) -> RecommendationResult<IngestionReport> {
        let start = Instant::now();
        let result = self.ingest_all().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(report) => {
                IngestionMetrics::record_run_completed(report.upserted, duration_ms);
                info!(
                    total = report.total,
                    valid = report.valid,
                    skipped = report.skipped,
                    upserted = report.upserted,
                    duration_ms,
                    "Ingestion completed"
                );
            }
            Err(e) => {
                IngestionMetrics::record_run_failed(duration_ms);
                warn!(error = %e, duration_ms, "Ingestion failed");
            }
        }
        result
    }

    async fn ingest_all(&self) -> RecommendationResult<IngestionReport> {
        if self.batch_size == 0 {
            return Err(RecommendationError::Validation(
                "batch size must be at least 1".to_string(),
            ));
        }

        let mut report = IngestionReport::default();
        let mut pages = Box::pin(profile_pages(Arc::clone(&self.store), self.batch_size));

        while let Some(records) = pages.try_next().await? {
            report.merge(self.ingest_page(records).await?);
        }
        Ok(report)
    }

    /// Embeds and upserts one page of records.
    pub async fn ingest_page(
        &self,
        records: Vec<ProfileRecord>,
    ) -> RecommendationResult<IngestionReport> {
        let mut report = IngestionReport {
            total: records.len(),
            ..IngestionReport::default()
        };

        let mut profiles = Vec::with_capacity(records.len());
        for record in records {
            match record.into_profile() {
                Ok(profile) => profiles.push(profile),
                Err(incomplete) => {
                    report.skipped += 1;
                    warn!(
                        user_id = %incomplete.id,
                        field = %incomplete.field,
                        "Skipping incomplete profile"
                    );
                }
            }
        }
        report.valid = profiles.len();

        if !profiles.is_empty() {
            let model = self.embedder.model();
            let texts: Vec<String> = profiles.iter().map(canonical_text).collect();

            let embed_start = Instant::now();
            let vectors = retry_when(
                || self.embedder.embed_batch(&texts),
                self.retry.clone(),
                RecommendationError::is_transient,
            )
            .await?;
            RecommendationMetrics::record_embedding("ingest", texts.len(), embed_start.elapsed());

            if vectors.len() != profiles.len() {
                return Err(RecommendationError::Internal(format!(
                    "embedded {} of {} profiles",
                    vectors.len(),
                    profiles.len()
                )));
            }
            ensure_dimension(&model, &vectors)?;

            let entries: Vec<IndexEntry> = profiles
                .iter()
                .zip(vectors)
                .map(|(profile, vector)| {
                    IndexEntry::new(vector, EntryPayload::from_profile(profile, &model.name))
                })
                .collect();

            report.upserted = retry_when(
                || self.index.upsert_batch(entries.clone()),
                self.retry.clone(),
                RecommendationError::is_transient,
            )
            .await?;
        }

        IngestionMetrics::record_page(report.total, report.skipped, report.upserted);
        Ok(report)
    }
}
