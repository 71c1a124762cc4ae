use async_trait::async_trait;
use domain_profiles::{ProfileChangeListener, ProfileRecord};
use observability::IngestionMetrics;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::embedding::{EmbeddingProvider, ensure_dimension};
use crate::error::RecommendationResult;
use crate::index::VectorIndex;
use crate::models::{EntryPayload, IndexEntry};
use crate::text::{canonical_text, entry_id};

/// What a single-profile sync did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Upserted,
    /// The record can no longer be embedded; its entry was removed
    Removed,
    /// Nothing to key an entry on
    Skipped,
}

/// Keeps index entries in step with individual profile writes.
///
/// Registered as a [`ProfileChangeListener`] on the profile write path, and
/// used directly by the single-profile reindex command.
#[derive(Clone)]
pub struct ProfileIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl ProfileIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Re-embeds and upserts the record.
    ///
    /// An incomplete record with a username has its stale entry deleted.
    pub async fn index_record(&self, record: &ProfileRecord) -> RecommendationResult<SyncOutcome> {
        let profile = match record.clone().into_profile() {
            Ok(profile) => profile,
            Err(incomplete) => {
                let Some(username) = record.username.as_deref().filter(|u| !u.trim().is_empty())
                else {
                    return Ok(SyncOutcome::Skipped);
                };
                debug!(user_id = %incomplete.id, field = %incomplete.field, "Profile incomplete, removing entry");
                self.remove(username).await?;
                return Ok(SyncOutcome::Removed);
            }
        };

        let model = self.embedder.model();
        let vector = self.embedder.embed(&canonical_text(&profile)).await?;
        ensure_dimension(&model, std::slice::from_ref(&vector))?;

        self.index
            .upsert(IndexEntry::new(
                vector,
                EntryPayload::from_profile(&profile, &model.name),
            ))
            .await?;
        Ok(SyncOutcome::Upserted)
    }

    /// Deletes the entry keyed by `username`, if any.
    pub async fn remove(&self, username: &str) -> RecommendationResult<()> {
        self.index.delete(entry_id(username)).await
    }
}

#[async_trait]
impl ProfileChangeListener for ProfileIndexer {
    async fn profile_saved(&self, record: &ProfileRecord) {
        match self.index_record(record).await {
            Ok(outcome) => {
                debug!(user_id = %record.id, ?outcome, "Synced profile to index");
                IngestionMetrics::record_sync("upsert", true);
            }
            Err(e) => {
                warn!(user_id = %record.id, error = %e, "Failed to sync profile to index");
                IngestionMetrics::record_sync("upsert", false);
            }
        }
    }

    async fn profile_deleted(&self, previous: &ProfileRecord) {
        let Some(username) = previous.username.as_deref() else {
            return;
        };

        match self.remove(username).await {
            Ok(()) => IngestionMetrics::record_sync("delete", true),
            Err(e) => {
                warn!(user_id = %previous.id, error = %e, "Failed to remove profile from index");
                IngestionMetrics::record_sync("delete", false);
            }
        }
    }
}
