use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use axum_helpers::{AppError, ErrorResponse, JwtClaims, JwtVerifier, jwt_auth_middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use uuid::Uuid;

use crate::error::{RecommendationError, RecommendationResult};
use crate::models::{Identity, Recommendation, RecommendationParams};
use crate::service::RecommendationService;

pub const TAG: &str = "recommendations";

struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation for the Recommendations API
#[derive(OpenApi)]
#[openapi(
    paths(get_recommendations),
    components(schemas(Recommendation, ErrorResponse)),
    modifiers(&BearerAuth),
    servers(
        (url = "/api", description = "API base path")
    ),
    tags(
        (name = TAG, description = "Friend recommendations based on profile similarity")
    )
)]
pub struct ApiDoc;

/// Routes behind JWT authentication.
///
/// Mounted under `/recommendations`; the binary nests it below `/api`.
pub fn router(service: RecommendationService, verifier: JwtVerifier) -> Router {
    Router::new()
        .route("/recommendations", get(get_recommendations))
        .route_layer(middleware::from_fn_with_state(verifier, jwt_auth_middleware))
        .with_state(Arc::new(service))
}

/// Builds the requester identity from verified token claims.
pub fn identity_from_claims(claims: &JwtClaims) -> RecommendationResult<Identity> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| RecommendationError::Unauthenticated)?;
    if claims.username.trim().is_empty() {
        return Err(RecommendationError::Unauthenticated);
    }
    Ok(Identity::new(user_id, claims.username.clone()))
}

/// Recommend friends for the authenticated user
///
/// Results are ordered by descending `match_percentage`.
#[utoipa::path(
    get,
    path = "/recommendations",
    tag = TAG,
    params(RecommendationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ranked recommendations", body = Vec<Recommendation>),
        (status = 400, description = "Limit out of range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Requester has no stored profile", body = ErrorResponse),
        (status = 422, description = "Requester profile is incomplete", body = ErrorResponse),
        (status = 502, description = "Vector index or profile store failed", body = ErrorResponse),
        (status = 503, description = "Embedding model not ready", body = ErrorResponse)
    )
)]
async fn get_recommendations(
    State(service): State<Arc<RecommendationService>>,
    claims: Option<Extension<JwtClaims>>,
    query: Result<Query<RecommendationParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let Query(params) = query?;
    let Some(Extension(claims)) = claims else {
        return Err(RecommendationError::Unauthenticated.into());
    };

    let identity = identity_from_claims(&claims)?;
    let results = service.recommend(&identity, params.limit).await?;
    Ok(Json(results))
}
