//! Extension management commands.
//!
//! - `badm extension list` - print each extension's name
//! - `badm extension add <path>` - verify and append a module
//! - `badm extension remove <path>` - drop a module reference

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::read_configuration;
use crate::config::Configuration;
use crate::extension::{LoadedExtensions, WasmExtension};

/// Print the name of every configured extension, in order.
pub fn list<W: Write>(config_path: &Path, out: &mut W) -> Result<()> {
    let config = read_configuration(config_path)?;
    let extensions = LoadedExtensions::load_all(&config.extensions).context("open extensions")?;

    for name in extensions.list_names().context("list extensions")? {
        writeln!(out, "{name}").context("list extensions")?;
    }
    Ok(())
}

/// Append `path` to the extension list.
///
/// The module is opened first so that a path that cannot be loaded is never
/// stored. The path itself is stored as given.
pub fn add(config_path: &Path, path: &Path) -> Result<()> {
    WasmExtension::open(&wasmtime::Engine::default(), path).context("open extension")?;

    Configuration::update(config_path, |c| {
        c.add_extension(path.to_path_buf());
        Ok(())
    })
    .context("update configuration")?;

    tracing::debug!(path = %path.display(), "added extension");
    Ok(())
}

/// Remove every reference to `path` from the extension list.
pub fn remove(config_path: &Path, path: &Path) -> Result<()> {
    let mut removed = false;
    Configuration::update(config_path, |c| {
        removed = c.remove_extension(path);
        Ok(())
    })
    .context("update configuration")?;

    if !removed {
        anyhow::bail!("Extension not configured: {}", path.display());
    }
    Ok(())
}
