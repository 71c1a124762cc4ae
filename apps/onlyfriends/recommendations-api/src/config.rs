use axum_helpers::JwtConfig;
use core_config::{AppInfo, Environment, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_recommendations::{EmbeddingConfig, QdrantConfig, RecommendationConfig};

/// Application-specific configuration
/// Composes shared config components from the `core_config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub jwt: JwtConfig,
    pub qdrant: QdrantConfig,
    pub recommendations: RecommendationConfig,
    pub embedding: EmbeddingConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?, // HOST=0.0.0.0, PORT=8003
            database: PostgresConfig::from_env()?, // Required - will fail if not set
            jwt: JwtConfig::from_env()?,
            qdrant: QdrantConfig::from_env()?,
            recommendations: RecommendationConfig::from_env()?,
            embedding: EmbeddingConfig::from_env()?,
        })
    }
}
