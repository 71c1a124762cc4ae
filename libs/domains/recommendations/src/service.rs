use domain_profiles::ProfileStore;
use observability::RecommendationMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::config::RecommendationConfig;
use crate::embedding::{EmbeddingProvider, ensure_dimension};
use crate::error::{RecommendationError, RecommendationResult};
use crate::index::{VectorIndex, collection_exists};
use crate::models::{Identity, NearestQuery, Recommendation};
use crate::scoring::{ScoredHits, score_hits};
use crate::text::canonical_text;

/// Friend recommendations for an authenticated user.
///
/// Read-only against both the profile store and the index. Each request runs
/// its steps in sequence and either returns a full result list or an error.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn ProfileStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    default_limit: usize,
    max_limit: usize,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: &RecommendationConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Requested result count, or the default; must lie in `1..=max_limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> RecommendationResult<usize> {
        let limit = requested.unwrap_or(self.default_limit);
        if !(1..=self.max_limit).contains(&limit) {
            return Err(RecommendationError::Validation(format!(
                "limit must be between 1 and {}",
                self.max_limit
            )));
        }
        Ok(limit)
    }

    /// Up to `limit` other users ranked by profile similarity, best first.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id, limit))]
    pub async fn recommend(
        &self,
        identity: &Identity,
        limit: Option<usize>,
    ) -> RecommendationResult<Vec<Recommendation>> {
        let start = Instant::now();
        let result = self.run(identity, limit).await;

        match &result {
            Ok(results) => RecommendationMetrics::record_served(
                results.len(),
                start.elapsed().as_millis() as u64,
            ),
            Err(e) => {
                debug!(error = %e, "Recommendation request failed");
                RecommendationMetrics::record_failed(e.kind());
            }
        }
        result
    }

    async fn run(
        &self,
        identity: &Identity,
        limit: Option<usize>,
    ) -> RecommendationResult<Vec<Recommendation>> {
        if identity.user_id.is_nil() || identity.username.trim().is_empty() {
            return Err(RecommendationError::Unauthenticated);
        }
        let desired = self.resolve_limit(limit)?;

        let record = self
            .store
            .get(identity.user_id)
            .await?
            .ok_or(RecommendationError::ProfileNotFound(identity.user_id))?;
        let profile = record.into_profile()?;

        if !self.embedder.is_ready() {
            return Err(RecommendationError::EmbeddingUnavailable(
                "model is not loaded".to_string(),
            ));
        }
        let model = self.embedder.model();

        let embed_start = Instant::now();
        let vector = self.embedder.embed(&canonical_text(&profile)).await?;
        RecommendationMetrics::record_embedding("query", 1, embed_start.elapsed());
        ensure_dimension(&model, std::slice::from_ref(&vector))?;

        let hits = self
            .index
            .query(NearestQuery {
                vector,
                limit: desired + 1,
                model: model.name,
            })
            .await?;

        // The stored username is what the index is keyed on.
        let requester = Identity::new(profile.id, profile.username);
        let scored = score_hits(hits, &requester, desired);
        record_drops(&scored);

        Ok(scored.results)
    }

    /// Fails with `CollectionMissing` until the collection has been created.
    pub async fn check_index(&self) -> RecommendationResult<()> {
        if collection_exists(self.index.as_ref()).await? {
            Ok(())
        } else {
            Err(RecommendationError::CollectionMissing(
                "recommendation index".to_string(),
            ))
        }
    }
}

fn record_drops(scored: &ScoredHits) {
    RecommendationMetrics::record_dropped("self", scored.dropped_self);
    RecommendationMetrics::record_dropped("missing_distance", scored.dropped_missing_distance);
    RecommendationMetrics::record_dropped("malformed", scored.dropped_malformed);
    RecommendationMetrics::record_dropped("duplicate", scored.dropped_duplicate);
}
