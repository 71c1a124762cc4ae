use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance,
    Filter, PointId, PointStruct, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Qdrant, QdrantError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{RecommendationError, RecommendationResult};
use crate::index::VectorIndex;
use crate::models::{CollectionInfo, CollectionStatus, IndexEntry, IndexHit, NearestQuery};

const MODEL_FIELD: &str = "embedding_model";

/// Qdrant-backed [`VectorIndex`] bound to one cosine collection.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantIndex {
    pub fn new(config: &QdrantConfig, collection: impl Into<String>) -> RecommendationResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder.build().map_err(|e| {
            RecommendationError::IndexUnavailable(format!("Failed to build client: {}", e))
        })?;

        Ok(Self::from_client(client, collection))
    }

    pub fn from_client(client: Qdrant, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    fn classify(&self, err: QdrantError) -> RecommendationError {
        classify_message(&self.collection, err.to_string())
    }

    fn to_point(entry: IndexEntry) -> RecommendationResult<PointStruct> {
        let payload = payload_to_qdrant(serde_json::to_value(entry.payload)?);
        Ok(PointStruct::new(
            PointId::from(entry.id.to_string()),
            entry.vector,
            payload,
        ))
    }

    fn to_hit(point: ScoredPoint) -> Option<IndexHit> {
        let id = point.id.as_ref().and_then(point_id_to_uuid);
        let Some(id) = id else {
            warn!("Skipping search hit with unusable point id");
            return None;
        };

        Some(IndexHit {
            id,
            payload: qdrant_to_payload(point.payload),
            distance: score_to_distance(point.score),
        })
    }
}

fn classify_message(collection: &str, message: String) -> RecommendationError {
    let lowered = message.to_lowercase();
    if lowered.contains("doesn't exist") || lowered.contains("not found") {
        RecommendationError::CollectionMissing(collection.to_string())
    } else {
        RecommendationError::IndexUnavailable(message)
    }
}

/// Qdrant reports cosine similarity as the score.
fn score_to_distance(score: f32) -> Option<f32> {
    score.is_finite().then(|| 1.0 - score)
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
    match &point_id.point_id_options {
        Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str).ok(),
        Some(qdrant::point_id::PointIdOptions::Num(num)) => Some(Uuid::from_u128(*num as u128)),
        None => None,
    }
}

fn payload_to_qdrant(value: serde_json::Value) -> HashMap<String, QdrantValue> {
    let serde_json::Value::Object(map) = value else {
        return HashMap::new();
    };

    map.into_iter()
        .filter_map(|(key, val)| json_to_qdrant_value(val).map(|v| (key, v)))
        .collect()
}

fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = payload
        .into_iter()
        .filter_map(|(key, val)| qdrant_value_to_json(val).map(|v| (key, v)))
        .collect();
    serde_json::Value::Object(map)
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    use qdrant::value::Kind;

    match val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(QdrantValue::from(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(QdrantValue::from(i))
            } else {
                n.as_f64().map(QdrantValue::from)
            }
        }
        serde_json::Value::String(s) => Some(QdrantValue::from(s)),
        serde_json::Value::Array(items) => Some(QdrantValue {
            kind: Some(Kind::ListValue(qdrant::ListValue {
                values: items.into_iter().filter_map(json_to_qdrant_value).collect(),
            })),
        }),
        serde_json::Value::Object(map) => Some(QdrantValue {
            kind: Some(Kind::StructValue(qdrant::Struct {
                fields: payload_to_qdrant(serde_json::Value::Object(map)),
            })),
        }),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s)),
        Some(Kind::ListValue(list)) => Some(serde_json::Value::Array(
            list.values
                .into_iter()
                .filter_map(qdrant_value_to_json)
                .collect(),
        )),
        Some(Kind::StructValue(s)) => Some(qdrant_to_payload(s.fields)),
        None => None,
    }
}

fn extract_dimension(config: &Option<qdrant::CollectionConfig>) -> usize {
    let vectors = config
        .as_ref()
        .and_then(|c| c.params.as_ref())
        .and_then(|p| p.vectors_config.as_ref())
        .and_then(|vc| vc.config.as_ref());

    match vectors {
        Some(qdrant::vectors_config::Config::Params(p)) => p.size as usize,
        Some(qdrant::vectors_config::Config::ParamsMap(map)) => {
            map.map.values().next().map(|p| p.size as usize).unwrap_or(0)
        }
        None => 0,
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn collection_info(&self) -> RecommendationResult<Option<CollectionInfo>> {
        if !self.client.collection_exists(self.collection.as_str()).await? {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(self.collection.as_str())
            .await
            .map_err(|e| self.classify(e))?;

        let Some(result) = info.result else {
            return Ok(None);
        };

        Ok(Some(CollectionInfo {
            name: self.collection.clone(),
            dimension: extract_dimension(&result.config),
            points_count: result.points_count.unwrap_or(0),
        }))
    }

    async fn create_collection(&self, dimension: usize) -> RecommendationResult<CollectionStatus> {
        let builder = CreateCollectionBuilder::new(&self.collection).vectors_config(
            VectorParamsBuilder::new(dimension as u64, Distance::Cosine),
        );

        match self.client.create_collection(builder).await {
            Ok(_) => Ok(CollectionStatus::Created),
            Err(e) if e.to_string().to_lowercase().contains("already exists") => {
                debug!(collection = %self.collection, "Collection created concurrently");
                Ok(CollectionStatus::AlreadyExists)
            }
            Err(e) => Err(RecommendationError::IndexUnavailable(e.to_string())),
        }
    }

    async fn upsert(&self, entry: IndexEntry) -> RecommendationResult<()> {
        self.upsert_batch(vec![entry]).await.map(|_| ())
    }

    async fn upsert_batch(&self, entries: Vec<IndexEntry>) -> RecommendationResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let points = entries
            .into_iter()
            .map(Self::to_point)
            .collect::<RecommendationResult<Vec<_>>>()?;
        let written = points.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| self.classify(e))?;

        Ok(written)
    }

    async fn delete(&self, id: Uuid) -> RecommendationResult<()> {
        let builder = DeletePointsBuilder::new(&self.collection)
            .points(vec![PointId::from(id.to_string())])
            .wait(true);

        self.client
            .delete_points(builder)
            .await
            .map_err(|e| self.classify(e))?;
        Ok(())
    }

    async fn query(&self, query: NearestQuery) -> RecommendationResult<Vec<IndexHit>> {
        let builder = SearchPointsBuilder::new(&self.collection, query.vector, query.limit as u64)
            .filter(Filter::must([Condition::matches(MODEL_FIELD, query.model)]))
            .with_payload(true);

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| self.classify(e))?;

        Ok(response.result.into_iter().filter_map(Self::to_hit).collect())
    }

    async fn count(&self) -> RecommendationResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| self.classify(e))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn count_model(&self, model: &str) -> RecommendationResult<u64> {
        let builder = CountPointsBuilder::new(&self.collection)
            .filter(Filter::must([Condition::matches(
                MODEL_FIELD,
                model.to_string(),
            )]))
            .exact(true);

        let response = self
            .client
            .count(builder)
            .await
            .map_err(|e| self.classify(e))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}
