//! Recommendations API
//!
//! Serves `GET /api/recommendations` for authenticated users, plus `/health`,
//! `/ready`, `/metrics` and Swagger UI.

use axum::{middleware, routing::get};
use axum_helpers::server::{create_production_app, create_router, health_router};
use axum_helpers::JwtVerifier;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_profiles::{PgProfileStore, ProfileStore};
use domain_recommendations::{
    ApiDoc, EmbeddingProvider, IndexBackend, IngestionJob, RecommendationService, VectorIndex,
    ensure_collection, handlers, index_from_config, provider_from_config,
};
use eyre::WrapErr;
use observability::{metrics_handler, metrics_middleware};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod ready;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    observability::init_metrics().wrap_err("Failed to install Prometheus recorder")?;

    info!("Connecting to profile store...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
    let store: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(db.clone()));

    let embedder: Arc<dyn EmbeddingProvider> = provider_from_config(&config.embedding)
        .wrap_err("Failed to initialize embedding provider")?;
    let model = embedder.model();
    info!(model = %model.name, dimension = model.dimension, "Embedding provider ready to load");

    let index: Arc<dyn VectorIndex> =
        index_from_config(&config.recommendations, &config.qdrant)
            .wrap_err("Failed to initialize vector index client")?;

    // Refuse to serve traffic without a usable collection
    let status = ensure_collection(index.as_ref(), &model)
        .await
        .wrap_err_with(|| {
            format!(
                "Failed to ensure collection '{}'",
                config.recommendations.collection
            )
        })?;
    info!(collection = %config.recommendations.collection, ?status, "Vector index ready");

    if config.recommendations.index == IndexBackend::Memory {
        info!("In-memory index selected, backfilling from the profile store");
        let report = IngestionJob::new(
            Arc::clone(&store),
            Arc::clone(&embedder),
            Arc::clone(&index),
            config.recommendations.batch_size,
        )
        .run()
        .await
        .wrap_err("Initial backfill failed")?;
        info!(upserted = report.upserted, skipped = report.skipped, "Backfill complete");
    }

    let service = RecommendationService::new(store, embedder, index, &config.recommendations);

    let api_routes = handlers::router(service.clone(), JwtVerifier::new(&config.jwt));

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<ApiDoc>(api_routes)?;

    // - /health: liveness with app name/version
    // - /ready: profile store, index collection and embedding model
    let app = router
        .merge(health_router(config.app))
        .merge(ready::ready_router(service))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware));

    info!(
        "Starting {} v{} with graceful shutdown (30s timeout)",
        config.app.name, config.app.version
    );

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Recommendations API shutdown complete");
    Ok(())
}
