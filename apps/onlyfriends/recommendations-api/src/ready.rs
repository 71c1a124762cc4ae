//! Readiness check covering every dependency of the recommendation path.

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_profiles::ProfileStore;
use domain_recommendations::{EmbeddingProvider, RecommendationService};

/// `/ready`: profile store, index collection and embedding model.
pub fn ready_router(service: RecommendationService) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(service)
}

async fn ready_handler(State(service): State<RecommendationService>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                service
                    .store()
                    .ping()
                    .await
                    .map_err(|e| format!("Profile store ping failed: {}", e))
            }),
        ),
        (
            "index",
            Box::pin(async {
                service
                    .check_index()
                    .await
                    .map_err(|e| format!("Vector index check failed: {}", e))
            }),
        ),
        (
            "model",
            Box::pin(async {
                if service.embedder().is_ready() {
                    Ok(())
                } else {
                    Err(format!(
                        "Embedding model '{}' is not loaded",
                        service.embedder().model().name
                    ))
                }
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain_profiles::InMemoryProfileStore;
    use domain_recommendations::{
        HashingProvider, InMemoryIndex, RecommendationConfig, VectorIndex, ensure_collection,
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn ready(index: Arc<InMemoryIndex>) -> (StatusCode, serde_json::Value) {
        let service = RecommendationService::new(
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(HashingProvider::default()),
            index,
            &RecommendationConfig::default(),
        );

        let response = ready_router(service)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_ready_without_collection() {
        let (status, body) = ready(Arc::new(InMemoryIndex::new("user_profiles"))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["index"], "disconnected");
        assert_eq!(body["database"], "connected");
        assert_eq!(body["model"], "connected");
    }

    #[tokio::test]
    async fn test_ready_once_collection_exists() {
        let index = Arc::new(InMemoryIndex::new("user_profiles"));
        ensure_collection(index.as_ref(), &HashingProvider::default().model())
            .await
            .unwrap();
        assert_eq!(index.count().await.unwrap(), 0);

        let (status, body) = ready(index).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }
}
