//! Select the database file commands operate on.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Configuration;

/// Select `path` if it is an existing file.
///
/// The canonical absolute path is stored, so later invocations work from any
/// directory. Returns the stored path.
pub fn execute(config_path: &Path, path: &Path) -> Result<PathBuf> {
    let selected = fs::canonicalize(path)
        .with_context(|| format!("Database file not found: {}", path.display()))?;
    if !selected.is_file() {
        anyhow::bail!("Not a file: {}", selected.display());
    }

    Configuration::update(config_path, |c| {
        c.select(&selected);
        Ok(())
    })
    .context("update configuration")?;

    tracing::debug!(path = %selected.display(), "selected database");
    Ok(selected)
}
