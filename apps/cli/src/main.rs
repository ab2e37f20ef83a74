//! # stockroom
//!
//! Command line front end for the Stockroom inventory.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize tracing (stderr; RUST_LOG or --verbose)                  │
//! │  3. Load AppConfig from .env + environment, apply --db                  │
//! │  4. Open the SQLite database and run migrations                         │
//! │  5. Dispatch the command, print table or JSON on stdout                 │
//! │  6. Close the pool                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod config;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::CommandContext;
use crate::config::AppConfig;
use stockroom_db::{Database, DbConfig, DbError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = hint_for(&err) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env()
        .context("invalid configuration")?
        .with_database_path(cli.db);

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create data directory {}", parent.display())
            })?;
        }
    }

    info!(path = %config.database_path.display(), "Opening database");
    let db = Database::new(DbConfig::new(config.database_path.clone()))
        .await
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let ctx = CommandContext {
        db,
        config,
        json: cli.json,
    };

    let result = commands::dispatch(&ctx, cli.command).await;
    ctx.db.close().await;
    debug!("Database closed");
    result
}

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set. Otherwise `--verbose` shows our debug output
/// and the default only shows warnings.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,stockroom=debug,sqlx=warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Extra guidance for failures the user has to act on.
fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let db_err = err.chain().find_map(|e| e.downcast_ref::<DbError>())?;
    if db_err.is_partial_write() {
        Some(
            "the stock change may not have been applied; run `stockroom inventory reconcile <product> \
             --opening <qty>` to confirm the level still matches the transaction log",
        )
    } else if matches!(db_err, DbError::ConcurrentModification { .. }) {
        Some("another process changed this stock level; run the command again")
    } else if matches!(db_err, DbError::Busy(_)) {
        Some("another process is holding the database lock; nothing was written, run the command again")
    } else if db_err.is_store_unavailable() {
        Some("check that the database path is writable (see --db or STOCKROOM_DB_PATH)")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_write_gets_a_hint() {
        let err = anyhow::Error::new(DbError::PartialWrite {
            product_id: 4,
            stage: "commit",
            message: "disk I/O error".into(),
        })
        .context("failed to record sale of product 4");

        let hint = hint_for(&err).unwrap();
        assert!(hint.contains("reconcile"));
    }

    #[test]
    fn test_locked_database_gets_a_retry_hint() {
        let err = anyhow::Error::new(DbError::Busy("database is locked".into()))
            .context("failed to restock product 2");

        let hint = hint_for(&err).unwrap();
        assert!(hint.contains("run the command again"));
    }

    #[test]
    fn test_validation_error_has_no_hint() {
        let err = anyhow::Error::new(DbError::not_found("Product", 9));
        assert!(hint_for(&err).is_none());
    }
}
