use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{error, info};

use super::{EmbeddingProvider, ensure_dimension};
use crate::error::{RecommendationError, RecommendationResult};
use crate::models::EmbeddingModelInfo;

pub const FASTEMBED_MODEL_NAME: &str = "all-MiniLM-L6-v2";
const FASTEMBED_DIMENSION: usize = 384;

/// Local all-MiniLM-L6-v2 through fastembed (ONNX runtime).
///
/// The model loads on a blocking thread after construction; until it is ready
/// every call fails with `EmbeddingUnavailable`.
/// `TextEmbedding::embed` needs `&mut self`, hence the mutex.
#[derive(Clone)]
pub struct FastEmbedProvider {
    model: Arc<OnceLock<Mutex<TextEmbedding>>>,
}

impl FastEmbedProvider {
    /// Starts loading the model in the background. Requires a Tokio runtime.
    pub fn spawn_load() -> Self {
        let model = Arc::new(OnceLock::new());
        let slot = Arc::clone(&model);

        tokio::task::spawn_blocking(move || {
            let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);
            match TextEmbedding::try_new(options) {
                Ok(te) => {
                    let _ = slot.set(Mutex::new(te));
                    info!(model = FASTEMBED_MODEL_NAME, "Embedding model loaded");
                }
                Err(e) => error!(model = FASTEMBED_MODEL_NAME, "Failed to load embedding model: {}", e),
            }
        });

        Self { model }
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn model(&self) -> EmbeddingModelInfo {
        EmbeddingModelInfo::new(FASTEMBED_MODEL_NAME, FASTEMBED_DIMENSION)
    }

    fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    async fn embed(&self, text: &str) -> RecommendationResult<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results.into_iter().next().ok_or_else(|| {
            RecommendationError::EmbeddingUnavailable("No embedding returned".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> RecommendationResult<Vec<Vec<f32>>> {
        if !self.is_ready() {
            return Err(RecommendationError::EmbeddingUnavailable(
                "model is still loading".to_string(),
            ));
        }
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let cell = model.get().ok_or_else(|| {
                RecommendationError::EmbeddingUnavailable("model is still loading".to_string())
            })?;
            let mut te = cell
                .lock()
                .map_err(|_| RecommendationError::Internal("embedding model lock poisoned".into()))?;
            te.embed(texts, None)
                .map_err(|e| RecommendationError::EmbeddingUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| RecommendationError::Internal(format!("embedding task failed: {}", e)))??;

        ensure_dimension(&self.model(), &vectors)?;
        Ok(vectors)
    }
}
