use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use domain_profiles::Profile;

use crate::text::entry_id;

/// Verified requester identity handed over by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Name and output size of an embedding model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub dimension: usize,
}

impl EmbeddingModelInfo {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }
}

/// Denormalized profile data stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub age: u32,
    pub city: String,
    pub interests: Vec<String>,
    /// Model that produced the vector; queries only match their own model.
    pub embedding_model: String,
}

impl EntryPayload {
    pub fn from_profile(profile: &Profile, model: &str) -> Self {
        Self {
            user_id: profile.id,
            username: profile.username.clone(),
            name: profile.name.clone(),
            age: profile.age,
            city: profile.city.clone(),
            interests: profile.interests.clone(),
            embedding_model: model.to_string(),
        }
    }
}

/// A vector and its payload, keyed by the username-derived entry id.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: EntryPayload,
}

impl IndexEntry {
    pub fn new(vector: Vec<f32>, payload: EntryPayload) -> Self {
        Self {
            id: entry_id(&payload.username),
            vector,
            payload,
        }
    }
}

/// Nearest-neighbour query against one model's entries.
#[derive(Debug, Clone)]
pub struct NearestQuery {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub model: String,
}

/// One raw index result, most similar first.
///
/// `payload` stays as JSON so malformed entries can be dropped during
/// scoring rather than failing the whole query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: Uuid,
    pub payload: serde_json::Value,
    /// Cosine distance (`1 - similarity`); `None` when the index did not report it
    pub distance: Option<f32>,
}

/// Collection metadata as reported by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub dimension: usize,
    pub points_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    Created,
    AlreadyExists,
}

/// A recommended friend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub username: String,
    pub name: String,
    pub age: u32,
    pub city: String,
    pub interests: Vec<String>,
    /// Similarity to the requester in `[0, 100]`
    #[schema(example = 87.5)]
    pub match_percentage: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationParams {
    /// Number of recommendations to return
    #[serde(alias = "topFriends")]
    #[param(minimum = 1, example = 10)]
    pub limit: Option<usize>,
}

/// Counts reported by a bulk ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Records read from the store
    pub total: usize,
    pub valid: usize,
    /// Records missing a required field
    pub skipped: usize,
    pub upserted: usize,
}

impl IngestionReport {
    pub fn merge(&mut self, other: IngestionReport) {
        self.total += other.total;
        self.valid += other.valid;
        self.skipped += other.skipped;
        self.upserted += other.upserted;
    }
}
