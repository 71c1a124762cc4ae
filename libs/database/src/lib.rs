//! Connection management for the profile record store.
//!
//! # Features
//!
//! - `postgres` (default): PostgreSQL via SeaORM
//! - `config`: `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry};
//! use core_config::FromEnv;
//!
//! let db = connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
