use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::error::{RecommendationError, RecommendationResult};
use crate::models::EmbeddingModelInfo;

/// Trait for embedding generation providers
///
/// Ingestion and the query path must share one provider configuration:
/// vectors from different models are not comparable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model name (stored with every index entry) and output dimension
    fn model(&self) -> EmbeddingModelInfo;

    /// Whether the model is loaded and can serve requests
    fn is_ready(&self) -> bool;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> RecommendationResult<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> RecommendationResult<Vec<Vec<f32>>>;
}

/// Rejects vectors whose size differs from what the model advertises.
pub fn ensure_dimension(
    model: &EmbeddingModelInfo,
    vectors: &[Vec<f32>],
) -> RecommendationResult<()> {
    match vectors.iter().find(|v| v.len() != model.dimension) {
        Some(bad) => Err(RecommendationError::ModelMismatch(format!(
            "model '{}' returned {} dimensions, expected {}",
            model.name,
            bad.len(),
            model.dimension
        ))),
        None => Ok(()),
    }
}

/// Polls until the provider reports ready or `timeout` elapses.
pub async fn wait_until_ready(
    provider: &dyn EmbeddingProvider,
    timeout: Duration,
) -> RecommendationResult<()> {
    let deadline = Instant::now() + timeout;
    while !provider.is_ready() {
        if Instant::now() >= deadline {
            return Err(RecommendationError::EmbeddingUnavailable(format!(
                "model '{}' not ready after {:?}",
                provider.model().name,
                timeout
            )));
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    Ok(())
}
