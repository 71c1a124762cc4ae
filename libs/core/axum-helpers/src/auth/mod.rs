//! JWT authentication for the recommendation API.
//!
//! Tokens are issued by the account service and signed with a shared HS256
//! secret. This module only verifies them and exposes the caller's identity to
//! handlers through request extensions.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtConfig, JwtVerifier, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let verifier = JwtVerifier::new(&JwtConfig::from_env()?);
//! let protected = Router::new()
//!     .route("/recommendations", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(verifier, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, JwtClaims, JwtVerifier};
pub use middleware::jwt_auth_middleware;
