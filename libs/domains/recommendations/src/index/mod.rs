//! Vector index abstraction and its backends.

mod memory;
pub mod qdrant;

pub use memory::InMemoryIndex;
pub use qdrant::{QdrantConfig, QdrantIndex};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::{IndexBackend, RecommendationConfig};
use crate::error::{RecommendationError, RecommendationResult};
use crate::models::{
    CollectionInfo, CollectionStatus, EmbeddingModelInfo, IndexEntry, IndexHit, NearestQuery,
};

/// A cosine-distance vector collection.
///
/// Each instance is bound to one collection. Upserts are idempotent by entry
/// id. Queries return hits most similar first and only consider entries
/// produced by the query's embedding model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// `None` when the collection does not exist
    async fn collection_info(&self) -> RecommendationResult<Option<CollectionInfo>>;

    /// Creates the collection; an existing one is reported, not an error.
    async fn create_collection(&self, dimension: usize) -> RecommendationResult<CollectionStatus>;

    async fn upsert(&self, entry: IndexEntry) -> RecommendationResult<()>;

    /// Returns the number of entries written
    async fn upsert_batch(&self, entries: Vec<IndexEntry>) -> RecommendationResult<usize>;

    async fn delete(&self, id: Uuid) -> RecommendationResult<()>;

    async fn query(&self, query: NearestQuery) -> RecommendationResult<Vec<IndexHit>>;

    /// Number of stored entries
    async fn count(&self) -> RecommendationResult<u64>;

    /// Number of stored entries produced by `model`
    async fn count_model(&self, model: &str) -> RecommendationResult<u64>;
}

/// Whether the index collection exists.
pub async fn collection_exists(index: &dyn VectorIndex) -> RecommendationResult<bool> {
    Ok(index.collection_info().await?.is_some())
}

/// Creates the collection if needed and checks its vector size.
///
/// An existing collection with a different vector size is a fatal
/// `ModelMismatch`; transport failures propagate unchanged. Entries written
/// by other models are tolerated, so the indexer can re-embed into it.
pub async fn prepare_collection(
    index: &dyn VectorIndex,
    model: &EmbeddingModelInfo,
) -> RecommendationResult<CollectionStatus> {
    if let Some(info) = index.collection_info().await? {
        if info.dimension != model.dimension {
            return Err(RecommendationError::ModelMismatch(format!(
                "collection '{}' stores {}-dimensional vectors but model '{}' produces {}",
                info.name, info.dimension, model.name, model.dimension
            )));
        }
        info!(collection = %info.name, points = info.points_count, "Collection already exists");
        return Ok(CollectionStatus::AlreadyExists);
    }

    let status = index.create_collection(model.dimension).await?;
    info!(dimension = model.dimension, ?status, "Ensured collection");
    Ok(status)
}

/// [`prepare_collection`], then refuses a populated collection that holds no
/// entries from `model`.
///
/// Queries only match entries of the active model, so serving from such a
/// collection would answer every request with an empty list.
pub async fn ensure_collection(
    index: &dyn VectorIndex,
    model: &EmbeddingModelInfo,
) -> RecommendationResult<CollectionStatus> {
    let status = prepare_collection(index, model).await?;

    let total = index.count().await?;
    if total > 0 && index.count_model(&model.name).await? == 0 {
        return Err(RecommendationError::ModelMismatch(format!(
            "none of the {} stored entries were produced by model '{}'; re-run ingestion",
            total, model.name
        )));
    }
    Ok(status)
}

/// Builds the configured backend for `config.collection`.
pub fn index_from_config(
    config: &RecommendationConfig,
    qdrant: &QdrantConfig,
) -> RecommendationResult<Arc<dyn VectorIndex>> {
    match config.index {
        IndexBackend::Qdrant => Ok(Arc::new(QdrantIndex::new(qdrant, &config.collection)?)),
        IndexBackend::Memory => Ok(Arc::new(InMemoryIndex::new(&config.collection))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(dimension: usize) -> CollectionInfo {
        CollectionInfo {
            name: "user_profiles".to_string(),
            dimension,
            points_count: 2,
        }
    }

    #[tokio::test]
    async fn test_ensure_collection_creates_when_missing() {
        let mut mock = MockVectorIndex::new();
        mock.expect_collection_info().times(1).returning(|| Ok(None));
        mock.expect_create_collection()
            .withf(|dim| *dim == 384)
            .times(1)
            .returning(|_| Ok(CollectionStatus::Created));
        mock.expect_count().returning(|| Ok(0));
        mock.expect_count_model().never();

        let status = ensure_collection(&mock, &EmbeddingModelInfo::new("m", 384))
            .await
            .unwrap();
        assert_eq!(status, CollectionStatus::Created);
    }

    #[tokio::test]
    async fn test_ensure_collection_accepts_existing() {
        let mut mock = MockVectorIndex::new();
        mock.expect_collection_info()
            .returning(|| Ok(Some(info(384))));
        mock.expect_create_collection().never();
        mock.expect_count().returning(|| Ok(2));
        mock.expect_count_model()
            .withf(|model| model == "m")
            .returning(|_| Ok(2));

        let status = ensure_collection(&mock, &EmbeddingModelInfo::new("m", 384))
            .await
            .unwrap();
        assert_eq!(status, CollectionStatus::AlreadyExists);
    }

    #[tokio::test]
    async fn test_ensure_collection_rejects_dimension_mismatch() {
        let mut mock = MockVectorIndex::new();
        mock.expect_collection_info()
            .returning(|| Ok(Some(info(1536))));

        let err = ensure_collection(&mock, &EmbeddingModelInfo::new("m", 384))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::ModelMismatch(_)));
    }

    #[tokio::test]
    async fn test_ensure_collection_propagates_transport_failure() {
        let mut mock = MockVectorIndex::new();
        mock.expect_collection_info()
            .returning(|| Err(RecommendationError::IndexUnavailable("refused".into())));

        let err = ensure_collection(&mock, &EmbeddingModelInfo::new("m", 384))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::IndexUnavailable(_)));
        assert!(collection_exists(&mock).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_collection_rejects_entries_from_other_model() {
        let mut mock = MockVectorIndex::new();
        mock.expect_collection_info()
            .returning(|| Ok(Some(info(384))));
        mock.expect_count().returning(|| Ok(2));
        mock.expect_count_model().returning(|_| Ok(0));

        let model = EmbeddingModelInfo::new("all-MiniLM-L6-v2", 384);
        let err = ensure_collection(&mock, &model).await.unwrap_err();
        assert!(matches!(err, RecommendationError::ModelMismatch(_)));

        // The indexer may still open it to re-embed
        assert_eq!(
            prepare_collection(&mock, &model).await.unwrap(),
            CollectionStatus::AlreadyExists
        );
    }
}
