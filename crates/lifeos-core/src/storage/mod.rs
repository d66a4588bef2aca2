mod config;
pub mod state_store;

pub use config::{Config, GardenConfig, KnowledgeConfig, ReviewConfig, TodoistConfig};
pub use state_store::{JsonFileStore, MemoryStore, StateStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the LifeOS data directory, creating it if needed.
///
/// `LIFEOS_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/lifeos[-dev]/`, with `LIFEOS_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("LIFEOS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("LIFEOS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("lifeos-dev")
            } else {
                base_dir.join("lifeos")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
