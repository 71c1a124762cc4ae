use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::EmbeddingProvider;
use crate::error::RecommendationResult;
use crate::models::EmbeddingModelInfo;

pub const HASHING_MODEL_NAME: &str = "hashing-trigram-v1";

/// Offline provider: signed feature hashing of character trigrams.
///
/// Texts sharing many trigrams land close under cosine similarity. It needs no
/// model download, so local runs and tests use it. Output is L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];

        for word in text.to_lowercase().split_whitespace() {
            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for gram in padded.windows(3) {
                let feature: String = gram.iter().collect();
                let digest = Sha256::digest(feature.as_bytes());

                let mut bucket = [0u8; 8];
                bucket.copy_from_slice(&digest[..8]);
                let slot = (u64::from_le_bytes(bucket) % self.dimension as u64) as usize;
                let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

                vector[slot] += sign;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn model(&self) -> EmbeddingModelInfo {
        EmbeddingModelInfo::new(HASHING_MODEL_NAME, self.dimension)
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> RecommendationResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> RecommendationResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
