//! # Axum Helpers
//!
//! Shared HTTP plumbing for the OnlyFriends services.
//!
//! - **[`auth`]**: HS256 JWT verification and the auth middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//! - **[`errors`]**: structured error responses with error codes

pub mod auth;
pub mod errors;
pub mod http;
pub mod server;

pub use auth::{ACCESS_TOKEN_TTL, JwtClaims, JwtConfig, JwtVerifier, jwt_auth_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};
