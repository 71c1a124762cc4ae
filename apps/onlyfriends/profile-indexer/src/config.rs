//! Configuration for the profile indexer

use core_config::{Environment, FromEnv};
use database::postgres::PostgresConfig;
use domain_recommendations::{EmbeddingConfig, QdrantConfig, RecommendationConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database: PostgresConfig,
    pub qdrant: QdrantConfig,
    pub recommendations: RecommendationConfig,
    pub embedding: EmbeddingConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            database: PostgresConfig::from_env()?,
            qdrant: QdrantConfig::from_env()?,
            recommendations: RecommendationConfig::from_env()?,
            embedding: EmbeddingConfig::from_env()?,
        })
    }
}
