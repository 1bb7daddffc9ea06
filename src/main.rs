//! task-board - Kanban boards on a local SQLite database.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Database, I/O or other environment failure
//! - 2: Invalid input, unknown id or a rejected card move

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use task_board::cli::{self, Cli};
use task_board::config::Config;
use task_board::infrastructure::db;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::from_env();
    let config_error = config.as_ref().err().map(|e| format!("{:#}", e));
    let mut config = config.unwrap_or_default();

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directives(cli.debug)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Failed to load config from env, using defaults: {}", e);
    }

    if let Some(url) = cli.database {
        config.database_url = url;
    }

    tracing::debug!(
        "Starting task-board v{} with {}",
        env!("CARGO_PKG_VERSION"),
        config.database_url
    );

    let result = match db::init_db(&config.database_url, config.pool_max_connections).await {
        Ok(pool) => {
            let result = cli::run(cli.command, &pool).await;
            pool.close().await;
            result
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_persistence_error() {
                tracing::error!("{:?}", e);
            }
            eprintln!("error: {}", e.user_message());
            ExitCode::from(e.exit_code())
        }
    }
}
