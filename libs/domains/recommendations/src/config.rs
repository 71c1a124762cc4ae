use core_config::{ConfigError, Environment, FromEnv, env_optional, env_or_default, env_parse};
use std::str::FromStr;

/// Embedding backend selected by `EMBEDDING_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    OpenAI,
    FastEmbed,
    Hashing,
}

impl FromStr for EmbeddingProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "fastembed" => Ok(Self::FastEmbed),
            "hashing" => Ok(Self::Hashing),
            other => Err(format!(
                "unknown provider '{}', expected openai, fastembed or hashing",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    /// Model id sent to OpenAI-compatible endpoints
    pub model: String,
    pub dimension: usize,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl FromEnv for EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let default_provider = if cfg!(feature = "fastembed") {
            "fastembed"
        } else {
            "hashing"
        };

        let provider = env_parse("EMBEDDING_PROVIDER", default_provider)?;

        // Trigram hashing measures text overlap, not meaning
        if provider == EmbeddingProviderKind::Hashing
            && Environment::from_env().is_production()
            && !env_parse::<bool>("EMBEDDING_ALLOW_HASHING", "false")?
        {
            return Err(ConfigError::ParseError {
                key: "EMBEDDING_PROVIDER".to_string(),
                details: "hashing is not a semantic model; use openai or fastembed in production, \
                          or set EMBEDDING_ALLOW_HASHING=true"
                    .to_string(),
            });
        }

        Ok(Self {
            provider,
            model: env_or_default("EMBEDDING_MODEL", "all-MiniLM-L6-v2"),
            dimension: env_parse("EMBEDDING_DIMENSION", "384")?,
            base_url: env_optional("EMBEDDING_BASE_URL"),
            api_key: env_optional("EMBEDDING_API_KEY"),
        })
    }
}

/// Vector index backend selected by `RECOMMENDATION_INDEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    Qdrant,
    Memory,
}

impl FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown index backend '{}'", other)),
        }
    }
}

/// Recommendation engine settings
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    pub collection: String,
    pub index: IndexBackend,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Store page size and embedding batch size during ingestion
    pub batch_size: usize,
}

impl RecommendationConfig {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_limit == 0 || !(1..=self.max_limit).contains(&self.default_limit) {
            return Err(ConfigError::ParseError {
                key: "RECOMMENDATION_DEFAULT_LIMIT".to_string(),
                details: format!(
                    "must be between 1 and RECOMMENDATION_MAX_LIMIT ({})",
                    self.max_limit
                ),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ParseError {
                key: "INGEST_BATCH_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            collection: "user_profiles".to_string(),
            index: IndexBackend::Qdrant,
            default_limit: 10,
            max_limit: 100,
            batch_size: 100,
        }
    }
}

impl FromEnv for RecommendationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self {
            collection: env_or_default("RECOMMENDATION_COLLECTION", "user_profiles"),
            index: env_parse("RECOMMENDATION_INDEX", "qdrant")?,
            default_limit: env_parse("RECOMMENDATION_DEFAULT_LIMIT", "10")?,
            max_limit: env_parse("RECOMMENDATION_MAX_LIMIT", "100")?,
            batch_size: env_parse("INGEST_BATCH_SIZE", "100")?,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 12] = [
        "APP_ENV",
        "EMBEDDING_ALLOW_HASHING",
        "RECOMMENDATION_COLLECTION",
        "RECOMMENDATION_INDEX",
        "RECOMMENDATION_DEFAULT_LIMIT",
        "RECOMMENDATION_MAX_LIMIT",
        "INGEST_BATCH_SIZE",
        "EMBEDDING_PROVIDER",
        "EMBEDDING_MODEL",
        "EMBEDDING_DIMENSION",
        "EMBEDDING_BASE_URL",
        "EMBEDDING_API_KEY",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = RecommendationConfig::from_env().unwrap();
            assert_eq!(config.collection, "user_profiles");
            assert_eq!(config.index, IndexBackend::Qdrant);
            assert_eq!(config.default_limit, 10);
            assert_eq!(config.max_limit, 100);
            assert_eq!(config.batch_size, 100);

            let embedding = EmbeddingConfig::from_env().unwrap();
            assert_eq!(embedding.model, "all-MiniLM-L6-v2");
            assert_eq!(embedding.dimension, 384);
            assert!(embedding.base_url.is_none());
        });
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("RECOMMENDATION_INDEX", Some("memory")),
                ("RECOMMENDATION_DEFAULT_LIMIT", Some("5")),
                ("EMBEDDING_PROVIDER", Some("OpenAI")),
                ("EMBEDDING_BASE_URL", Some("http://localhost:8080/v1")),
            ],
            || {
                let config = RecommendationConfig::from_env().unwrap();
                assert_eq!(config.index, IndexBackend::Memory);
                assert_eq!(config.default_limit, 5);

                let embedding = EmbeddingConfig::from_env().unwrap();
                assert_eq!(embedding.provider, EmbeddingProviderKind::OpenAI);
                assert_eq!(embedding.base_url.as_deref(), Some("http://localhost:8080/v1"));
            },
        );
    }

    #[test]
    fn test_default_limit_must_fit_max() {
        temp_env::with_vars(
            [
                ("RECOMMENDATION_DEFAULT_LIMIT", Some("50")),
                ("RECOMMENDATION_MAX_LIMIT", Some("20")),
            ],
            || {
                assert!(matches!(
                    RecommendationConfig::from_env(),
                    Err(ConfigError::ParseError { key, .. }) if key == "RECOMMENDATION_DEFAULT_LIMIT"
                ));
            },
        );
    }

    #[test]
    fn test_unknown_provider() {
        temp_env::with_var("EMBEDDING_PROVIDER", Some("word2vec"), || {
            assert!(EmbeddingConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_hashing_refused_in_production() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("EMBEDDING_PROVIDER", Some("hashing")),
                ("EMBEDDING_ALLOW_HASHING", None),
            ],
            || {
                assert!(matches!(
                    EmbeddingConfig::from_env(),
                    Err(ConfigError::ParseError { key, .. }) if key == "EMBEDDING_PROVIDER"
                ));
            },
        );
    }

    #[test]
    fn test_hashing_in_production_with_opt_in() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("EMBEDDING_PROVIDER", Some("hashing")),
                ("EMBEDDING_ALLOW_HASHING", Some("true")),
            ],
            || {
                let embedding = EmbeddingConfig::from_env().unwrap();
                assert_eq!(embedding.provider, EmbeddingProviderKind::Hashing);
            },
        );
    }

    #[test]
    fn test_semantic_provider_in_production() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("EMBEDDING_PROVIDER", Some("openai")),
            ],
            || {
                assert!(EmbeddingConfig::from_env().is_ok());
            },
        );
    }
}
