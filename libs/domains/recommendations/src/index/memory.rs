use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::VectorIndex;
use crate::error::{RecommendationError, RecommendationResult};
use crate::models::{CollectionInfo, CollectionStatus, IndexEntry, IndexHit, NearestQuery};

#[derive(Default)]
struct Collection {
    dimension: usize,
    entries: BTreeMap<Uuid, IndexEntry>,
}

/// Exact cosine search over entries held in memory.
///
/// Used by tests and local runs without Qdrant. Ties keep entry id order.
#[derive(Clone)]
pub struct InMemoryIndex {
    name: String,
    collection: Arc<RwLock<Option<Collection>>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: Arc::new(RwLock::new(None)),
        }
    }

    fn missing(&self) -> RecommendationError {
        RecommendationError::CollectionMissing(self.name.clone())
    }

    fn check_dimension(&self, expected: usize, entry: &IndexEntry) -> RecommendationResult<()> {
        if entry.vector.len() != expected {
            return Err(RecommendationError::ModelMismatch(format!(
                "collection '{}' expects {} dimensions, got {}",
                self.name,
                expected,
                entry.vector.len()
            )));
        }
        Ok(())
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(1.0 - dot / (norm_a * norm_b))
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn collection_info(&self) -> RecommendationResult<Option<CollectionInfo>> {
        let guard = self.collection.read().await;
        Ok(guard.as_ref().map(|c| CollectionInfo {
            name: self.name.clone(),
            dimension: c.dimension,
            points_count: c.entries.len() as u64,
        }))
    }

    async fn create_collection(&self, dimension: usize) -> RecommendationResult<CollectionStatus> {
        let mut guard = self.collection.write().await;
        if guard.is_some() {
            return Ok(CollectionStatus::AlreadyExists);
        }
        *guard = Some(Collection {
            dimension,
            entries: BTreeMap::new(),
        });
        Ok(CollectionStatus::Created)
    }

    async fn upsert(&self, entry: IndexEntry) -> RecommendationResult<()> {
        self.upsert_batch(vec![entry]).await.map(|_| ())
    }

    async fn upsert_batch(&self, entries: Vec<IndexEntry>) -> RecommendationResult<usize> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;

        for entry in &entries {
            self.check_dimension(collection.dimension, entry)?;
        }

        let written = entries.len();
        for entry in entries {
            collection.entries.insert(entry.id, entry);
        }
        Ok(written)
    }

    async fn delete(&self, id: Uuid) -> RecommendationResult<()> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;
        collection.entries.remove(&id);
        Ok(())
    }

    async fn query(&self, query: NearestQuery) -> RecommendationResult<Vec<IndexHit>> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;

        if query.vector.len() != collection.dimension {
            return Err(RecommendationError::ModelMismatch(format!(
                "query has {} dimensions, collection '{}' stores {}",
                query.vector.len(),
                self.name,
                collection.dimension
            )));
        }

        let mut scored: Vec<(f32, &IndexEntry)> = collection
            .entries
            .values()
            .filter(|e| e.payload.embedding_model == query.model)
            .filter_map(|e| cosine_distance(&query.vector, &e.vector).map(|d| (d, e)))
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        scored.truncate(query.limit);

        scored
            .into_iter()
            .map(|(distance, entry)| {
                Ok(IndexHit {
                    id: entry.id,
                    payload: serde_json::to_value(&entry.payload)?,
                    distance: Some(distance),
                })
            })
            .collect()
    }

    async fn count(&self) -> RecommendationResult<u64> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;
        Ok(collection.entries.len() as u64)
    }

    async fn count_model(&self, model: &str) -> RecommendationResult<u64> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;
        Ok(collection
            .entries
            .values()
            .filter(|e| e.payload.embedding_model == model)
            .count() as u64)
    }
}
