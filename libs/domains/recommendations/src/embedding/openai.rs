use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingProvider, ensure_dimension};
use crate::error::{RecommendationError, RecommendationResult};
use crate::models::EmbeddingModelInfo;

/// OpenAI-compatible embeddings endpoint configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub base_url: String,
    /// Omitted for self-hosted endpoints that do not check it
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
}

impl OpenAIConfig {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: model.into(),
            dimension,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Embeddings over the OpenAI `/embeddings` HTTP API
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model(&self) -> EmbeddingModelInfo {
        EmbeddingModelInfo::new(&self.config.model, self.config.dimension)
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> RecommendationResult<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results.into_iter().next().ok_or_else(|| {
            RecommendationError::EmbeddingUnavailable("No embedding returned".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> RecommendationResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.config.dimension,
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecommendationError::EmbeddingUnavailable(format!(
                "embeddings API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        // Sort by index to maintain order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(RecommendationError::EmbeddingUnavailable(format!(
                "embeddings API returned {} vectors for {} inputs",
                data.len(),
                texts.len()
            )));
        }

        let vectors: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();
        ensure_dimension(&self.model(), &vectors)?;
        Ok(vectors)
    }
}
