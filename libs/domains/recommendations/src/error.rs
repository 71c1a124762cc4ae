use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_profiles::{IncompleteProfile, ProfileError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Missing or invalid identity")]
    Unauthenticated,

    #[error("No profile stored for user {0}")]
    ProfileNotFound(Uuid),

    /// The requester's stored profile cannot be embedded
    #[error(transparent)]
    IncompleteProfile(#[from] IncompleteProfile),

    #[error("Embedding model unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Collection '{0}' does not exist")]
    CollectionMissing(String),

    #[error("Embedding model mismatch: {0}")]
    ModelMismatch(String),

    #[error("Profile store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RecommendationResult<T> = Result<T, RecommendationError>;

impl RecommendationError {
    /// Label used for the `outcome` dimension of request metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::IncompleteProfile(_) => "incomplete_profile",
            Self::EmbeddingUnavailable(_) => "embedding_unavailable",
            Self::IndexUnavailable(_) => "index_unavailable",
            Self::CollectionMissing(_) => "collection_missing",
            Self::ModelMismatch(_) => "model_mismatch",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }

    /// Transport failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::IndexUnavailable(_) | Self::EmbeddingUnavailable(_) | Self::StoreUnavailable(_)
        )
    }
}

impl From<ProfileError> for RecommendationError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(id) => RecommendationError::ProfileNotFound(id),
            ProfileError::InvalidPageSize(size) => {
                RecommendationError::Validation(format!("invalid page size {}", size))
            }
            ProfileError::Unavailable(msg) => RecommendationError::StoreUnavailable(msg),
        }
    }
}

impl From<qdrant_client::QdrantError> for RecommendationError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        RecommendationError::IndexUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for RecommendationError {
    fn from(err: reqwest::Error) -> Self {
        RecommendationError::EmbeddingUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for RecommendationError {
    fn from(err: serde_json::Error) -> Self {
        RecommendationError::Internal(format!("JSON error: {}", err))
    }
}

/// Convert RecommendationError to AppError for standardized HTTP error responses
impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::Unauthenticated => {
                AppError::Unauthorized("Missing or invalid identity".to_string())
            }
            RecommendationError::ProfileNotFound(id) => {
                AppError::NotFound(format!("No profile stored for user {}", id))
            }
            RecommendationError::IncompleteProfile(e) => AppError::UnprocessableEntity(e.to_string()),
            RecommendationError::EmbeddingUnavailable(msg) => {
                AppError::ServiceUnavailable(format!("Embedding model unavailable: {}", msg))
            }
            RecommendationError::IndexUnavailable(msg) => {
                AppError::BadGateway(format!("Vector index unavailable: {}", msg))
            }
            RecommendationError::StoreUnavailable(msg) => {
                AppError::BadGateway(format!("Profile store unavailable: {}", msg))
            }
            RecommendationError::CollectionMissing(name) => {
                AppError::ServiceUnavailable(format!("Collection '{}' is not initialized", name))
            }
            RecommendationError::ModelMismatch(msg) => {
                AppError::ServiceUnavailable(format!("Embedding model mismatch: {}", msg))
            }
            RecommendationError::Validation(msg) => AppError::BadRequest(msg),
            RecommendationError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
