mod config;
pub mod database;
pub mod migrations;
mod sessions;

pub use config::{Config, DefaultsConfig, LoggingConfig, StatsConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/focuslog[-dev]/` based on FOCUSLOG_ENV.
///
/// Set FOCUSLOG_ENV=dev to use the development data directory, or
/// FOCUSLOG_DATA_DIR to use an explicit one.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSLOG_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSLOG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuslog-dev")
            } else {
                base_dir.join("focuslog")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
