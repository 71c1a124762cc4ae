//! Index maintenance operations behind the CLI commands.

use axum_helpers::shutdown_signal;
use domain_profiles::ProfileStore;
use domain_recommendations::embedding::wait_until_ready;
use domain_recommendations::{
    EmbeddingProvider, IngestionJob, IngestionReport, ProfileIndexer, RecommendationConfig,
    RecommendationError, RecommendationResult, SyncOutcome, VectorIndex, prepare_collection,
};
use eyre::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};
use uuid::Uuid;

/// Collection and model state reported by `status`.
#[derive(Debug, Serialize)]
pub struct IndexerStatus {
    pub collection: String,
    pub exists: bool,
    pub points: u64,
    pub dimension: usize,
    pub model: String,
    pub model_dimension: usize,
    pub model_ready: bool,
}

#[derive(Clone)]
pub struct Indexer {
    store: Arc<dyn ProfileStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    config: RecommendationConfig,
}

impl Indexer {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            config,
        }
    }

    /// Waits for the model and makes sure the collection exists.
    ///
    /// Entries from a previous model do not block; ingesting replaces them.
    pub async fn prepare(&self, model_timeout: Duration) -> RecommendationResult<()> {
        wait_until_ready(self.embedder.as_ref(), model_timeout).await?;
        prepare_collection(self.index.as_ref(), &self.embedder.model()).await?;
        Ok(())
    }

    /// Full pass over the profile store.
    pub async fn ingest(&self, batch_size: Option<usize>) -> RecommendationResult<IngestionReport> {
        IngestionJob::new(
            Arc::clone(&self.store),
            Arc::clone(&self.embedder),
            Arc::clone(&self.index),
            batch_size.unwrap_or(self.config.batch_size),
        )
        .run()
        .await
    }

    /// Re-embeds a single profile.
    pub async fn reindex(&self, user_id: Uuid) -> RecommendationResult<SyncOutcome> {
        let record = self
            .store
            .get(user_id)
            .await?
            .ok_or(RecommendationError::ProfileNotFound(user_id))?;

        ProfileIndexer::new(Arc::clone(&self.embedder), Arc::clone(&self.index))
            .index_record(&record)
            .await
    }

    pub async fn status(&self) -> RecommendationResult<IndexerStatus> {
        let model = self.embedder.model();
        let info = self.index.collection_info().await?;

        Ok(IndexerStatus {
            collection: self.config.collection.clone(),
            exists: info.is_some(),
            points: info.as_ref().map(|i| i.points_count).unwrap_or(0),
            dimension: info.as_ref().map(|i| i.dimension).unwrap_or(0),
            model: model.name,
            model_dimension: model.dimension,
            model_ready: self.embedder.is_ready(),
        })
    }

    /// Runs a full ingestion on every tick of `cron_expr` until SIGINT or SIGTERM.
    pub async fn run_scheduled(&self, cron_expr: &str, batch_size: Option<usize>) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled index resync");

        let mut sched = JobScheduler::new().await?;

        let indexer = self.clone();
        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let indexer = indexer.clone();

            Box::pin(async move {
                info!("Running scheduled ingestion");

                match indexer.ingest(batch_size).await {
                    Ok(report) => {
                        info!(
                            total = report.total,
                            skipped = report.skipped,
                            upserted = report.upserted,
                            "Scheduled ingestion complete"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled ingestion failed");
                    }
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler started, waiting for jobs...");
        shutdown_signal().await;

        info!("Stopping scheduler");
        sched.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_profiles::{InMemoryProfileStore, ProfileRecord, ProfileWriter};
    use domain_recommendations::{HashingProvider, InMemoryIndex};

    fn record(n: u128, username: &str, city: Option<&str>) -> ProfileRecord {
        ProfileRecord {
            id: Uuid::from_u128(n),
            username: Some(username.to_string()),
            name: Some(username.to_uppercase()),
            age: Some(28),
            city: city.map(str::to_string),
            interests: Some(vec!["climbing".to_string()]),
        }
    }

    fn indexer(store: InMemoryProfileStore) -> Indexer {
        Indexer::new(
            Arc::new(store),
            Arc::new(HashingProvider::new(32)),
            Arc::new(InMemoryIndex::new("user_profiles")),
            RecommendationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_status_before_and_after_ingest() {
        let indexer = indexer(InMemoryProfileStore::with_records([
            record(1, "ana", Some("Zagreb")),
            record(2, "ivo", Some("Split")),
            record(3, "eva", None),
        ]));

        let before = indexer.status().await.unwrap();
        assert!(!before.exists);
        assert!(before.model_ready);

        indexer.prepare(Duration::from_secs(1)).await.unwrap();
        let report = indexer.ingest(Some(2)).await.unwrap();
        assert_eq!((report.total, report.skipped, report.upserted), (3, 1, 2));

        let after = indexer.status().await.unwrap();
        assert!(after.exists);
        assert_eq!(after.points, 2);
        assert_eq!(after.dimension, 32);
        assert_eq!(after.model, "hashing-trigram-v1");
    }

    #[tokio::test]
    async fn test_reindex_single_profile() {
        let store = InMemoryProfileStore::with_records([record(1, "ana", None)]);
        let indexer = indexer(store.clone());
        indexer.prepare(Duration::from_secs(1)).await.unwrap();

        assert_eq!(
            indexer.reindex(Uuid::from_u128(1)).await.unwrap(),
            SyncOutcome::Removed
        );

        store.save(record(1, "ana", Some("Rijeka"))).await.unwrap();
        assert_eq!(
            indexer.reindex(Uuid::from_u128(1)).await.unwrap(),
            SyncOutcome::Upserted
        );
        assert_eq!(indexer.status().await.unwrap().points, 1);
    }

    #[tokio::test]
    async fn test_reindex_unknown_user() {
        let indexer = indexer(InMemoryProfileStore::new());
        indexer.prepare(Duration::from_secs(1)).await.unwrap();

        assert!(matches!(
            indexer.reindex(Uuid::from_u128(9)).await,
            Err(RecommendationError::ProfileNotFound(_))
        ));
    }
}
