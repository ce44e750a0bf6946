//! Path utilities for badm.
//!
//! - [`get_config_path`] - `~/.badm` (configuration document)

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the configuration location.
pub const CONFIG_ENV: &str = "BADM_CONFIG";

/// File name of the configuration document inside the home directory.
const CONFIG_FILE_NAME: &str = ".badm";

/// Get the configuration file path.
///
/// Resolution order:
/// 1. `BADM_CONFIG` environment variable (if set)
/// 2. `~/.badm` (default)
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(CONFIG_FILE_NAME))
}
