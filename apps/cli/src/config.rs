//! CLI configuration.
//!
//! Loaded from environment variables (after an optional `.env` file) with
//! fallback to defaults. Command-line flags override what is loaded here.
//!
//! | Variable                        | Default                         |
//! |---------------------------------|---------------------------------|
//! | `STOCKROOM_DB_PATH`             | `<data dir>/stockroom.db`       |
//! | `STOCKROOM_LOW_STOCK_THRESHOLD` | 10                              |
//! | `STOCKROOM_HIGH_VALUE_LIMIT`    | 10                              |
//! | `STOCKROOM_SALES_WINDOW_DAYS`   | 30                              |
//! | `STOCKROOM_RECENT_LIMIT`        | 50                              |

use directories::ProjectDirs;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use stockroom_core::{
    DEFAULT_HIGH_VALUE_LIMIT, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_RECENT_TRANSACTIONS,
    DEFAULT_SALES_WINDOW_DAYS,
};

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Low stock report threshold (units, exclusive)
    pub low_stock_threshold: i64,

    /// Rows in the high value report
    pub high_value_limit: i64,

    /// Sales summary window in days
    pub sales_window_days: i64,

    /// Rows in the transaction listing
    pub recent_limit: usize,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup("STOCKROOM_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        Ok(AppConfig {
            database_path,
            low_stock_threshold: parse_or(
                &lookup,
                "STOCKROOM_LOW_STOCK_THRESHOLD",
                DEFAULT_LOW_STOCK_THRESHOLD,
            )?,
            high_value_limit: parse_or(
                &lookup,
                "STOCKROOM_HIGH_VALUE_LIMIT",
                DEFAULT_HIGH_VALUE_LIMIT as i64,
            )?,
            sales_window_days: parse_or(
                &lookup,
                "STOCKROOM_SALES_WINDOW_DAYS",
                DEFAULT_SALES_WINDOW_DAYS,
            )?,
            recent_limit: parse_or(&lookup, "STOCKROOM_RECENT_LIMIT", DEFAULT_RECENT_TRANSACTIONS)?,
        })
    }

    /// Replaces the database path when `--db` was given.
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Platform data directory joined with `stockroom.db`.
///
/// - **macOS**: `~/Library/Application Support/com.stockroom.stockroom/stockroom.db`
/// - **Windows**: `%APPDATA%\stockroom\stockroom\data\stockroom.db`
/// - **Linux**: `~/.local/share/stockroom/stockroom.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs =
        ProjectDirs::from("com", "stockroom", "stockroom").ok_or(ConfigError::NoDataDirectory)?;
    Ok(dirs.data_dir().join("stockroom.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine a data directory; set STOCKROOM_DB_PATH")]
    NoDataDirectory,
}
