//! Profile Indexer
//!
//! Keeps the recommendation index in step with the profile store. Runs a
//! one-shot backfill, a single-profile reindex, or a scheduled resync.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_profiles::{PgProfileStore, ProfileStore};
use domain_recommendations::{index_from_config, provider_from_config};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

mod config;
mod indexer;

use config::Config;
use indexer::Indexer;

#[derive(Parser)]
#[command(name = "profile-indexer")]
#[command(about = "Embed OnlyFriends profiles into the recommendation index")]
struct Cli {
    /// Seconds to wait for the embedding model to load
    #[arg(long, global = true, default_value_t = 120)]
    model_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed every profile in the store
    Ingest {
        /// Profiles per page. Defaults to INGEST_BATCH_SIZE.
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Re-embed a single profile
    Reindex {
        /// User id of the profile
        user_id: Uuid,
    },

    /// Run as a scheduled resync service
    Schedule {
        /// Cron expression for scheduling (default: every 6 hours)
        #[arg(short, long, default_value = "0 0 */6 * * *")]
        cron: String,

        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Show collection and model status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    // --help and usage errors must not depend on the environment
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    observability::init_metrics().wrap_err("Failed to install Prometheus recorder")?;

    info!("Connecting to profile store...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
    let store: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(db));

    let embedder = provider_from_config(&config.embedding)
        .wrap_err("Failed to initialize embedding provider")?;
    let index = index_from_config(&config.recommendations, &config.qdrant)
        .wrap_err("Failed to initialize vector index client")?;

    let indexer = Indexer::new(store, embedder, index, config.recommendations.clone());
    let model_timeout = Duration::from_secs(cli.model_timeout);

    match cli.command {
        Commands::Ingest { batch_size } => {
            indexer.prepare(model_timeout).await?;
            let report = indexer.ingest(batch_size).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Reindex { user_id } => {
            indexer.prepare(model_timeout).await?;
            let outcome = indexer.reindex(user_id).await?;
            info!(%user_id, ?outcome, "Reindex complete");
        }

        Commands::Schedule { cron, batch_size } => {
            indexer.prepare(model_timeout).await?;
            indexer.run_scheduled(&cron, batch_size).await?;
        }

        Commands::Status => {
            let status = indexer.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_needs_no_environment() {
        let err = match Cli::try_parse_from(["profile-indexer", "--help"]) {
            Ok(_) => panic!("--help should short-circuit"),
            Err(e) => e,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["profile-indexer", "schedule"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schedule { ref cron, batch_size: None } if cron == "0 0 */6 * * *"
        ));
        assert_eq!(cli.model_timeout, 120);

        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["profile-indexer", "reindex", &id.to_string()]).unwrap();
        assert!(matches!(cli.command, Commands::Reindex { user_id } if user_id == id));

        assert!(Cli::try_parse_from(["profile-indexer", "reindex", "ana"]).is_err());
    }
}
