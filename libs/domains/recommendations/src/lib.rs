//! Friend recommendations for OnlyFriends.
//!
//! Profiles are turned into text (`age; city; interests`), embedded, and
//! stored in a cosine vector index keyed by username. A request embeds the
//! requester's own profile, asks the index for its nearest neighbours and
//! ranks them by match percentage.
//!
//! - [`service::RecommendationService`]: the per-request read path
//! - [`ingest::IngestionJob`]: bulk backfill and resync from the profile store
//! - [`sync::ProfileIndexer`]: re-embed on individual profile writes
//! - [`embedding`] and [`index`]: pluggable model and vector store backends

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod ingest;
pub mod models;
pub mod scoring;
pub mod service;
pub mod sync;
pub mod text;

pub use config::{EmbeddingConfig, EmbeddingProviderKind, IndexBackend, RecommendationConfig};
pub use embedding::{EmbeddingProvider, HashingProvider, provider_from_config};
pub use error::{RecommendationError, RecommendationResult};
pub use handlers::ApiDoc;
pub use index::{
    InMemoryIndex, QdrantConfig, QdrantIndex, VectorIndex, ensure_collection, index_from_config,
    prepare_collection,
};
pub use ingest::IngestionJob;
pub use models::{
    CollectionStatus, EmbeddingModelInfo, Identity, IngestionReport, Recommendation,
};
pub use scoring::match_percentage;
pub use service::RecommendationService;
pub use sync::{ProfileIndexer, SyncOutcome};
pub use text::{canonical_text, entry_id};
