mod hashing;
mod openai;
mod provider;

#[cfg(feature = "fastembed")]
mod fastembed;

pub use hashing::{HASHING_MODEL_NAME, HashingProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::{EmbeddingProvider, ensure_dimension, wait_until_ready};

#[cfg(test)]
pub use provider::MockEmbeddingProvider;

#[cfg(feature = "fastembed")]
pub use self::fastembed::{FASTEMBED_MODEL_NAME, FastEmbedProvider};

use std::sync::Arc;
use tracing::warn;

use crate::config::{EmbeddingConfig, EmbeddingProviderKind};
use crate::error::RecommendationResult;

/// Builds the configured provider.
pub fn provider_from_config(
    config: &EmbeddingConfig,
) -> RecommendationResult<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        EmbeddingProviderKind::Hashing => {
            warn!(
                model = HASHING_MODEL_NAME,
                "Using the lexical hashing embedder; matches reflect shared text, not meaning"
            );
            Ok(Arc::new(HashingProvider::new(config.dimension)))
        }
        EmbeddingProviderKind::OpenAI => {
            let mut openai = OpenAIConfig::new(&config.model, config.dimension);
            if let Some(base_url) = &config.base_url {
                openai = openai.with_base_url(base_url);
            }
            if let Some(api_key) = &config.api_key {
                openai = openai.with_api_key(api_key);
            }
            Ok(Arc::new(OpenAIProvider::new(openai)))
        }
        #[cfg(feature = "fastembed")]
        EmbeddingProviderKind::FastEmbed => Ok(Arc::new(FastEmbedProvider::spawn_load())),
        #[cfg(not(feature = "fastembed"))]
        EmbeddingProviderKind::FastEmbed => Err(
            crate::error::RecommendationError::EmbeddingUnavailable(
                "built without the `fastembed` feature".to_string(),
            ),
        ),
    }
}
