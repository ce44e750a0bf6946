//! CLI command implementations for badm.
//!
//! Each submodule implements a group of commands:
//!
//! - [`select`] - Choose the database file to operate on
//! - [`list`] - Buckets, keys, values and registered types
//! - [`set`] - Per-bucket type assignments
//! - [`extension`] - Extension module management
//!
//! Every command is a straight sequence: read the configuration, load
//! extensions if the command needs decoders or names, open the database if it
//! reads one, do the work, return. Errors are wrapped with the step that failed.

pub mod extension;
pub mod list;
pub mod select;
pub mod set;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Configuration;
use crate::error::Error;
use crate::extension::LoadedExtensions;
use crate::store::RedbStore;
use crate::types::TypeRegistry;

/// Read the configuration document.
fn read_configuration(config_path: &Path) -> Result<Configuration> {
    Configuration::load(config_path).context("read configuration")
}

/// Load configured extensions and build the type registry from them.
fn load_registry(config: &Configuration) -> Result<(TypeRegistry, LoadedExtensions)> {
    let extensions = LoadedExtensions::load_all(&config.extensions).context("open extensions")?;

    let mut registry = TypeRegistry::with_builtins();
    extensions
        .register_all_types(&mut registry)
        .context("register types")?;

    Ok((registry, extensions))
}

/// Open the selected database.
fn open_database(config: &Configuration) -> Result<RedbStore> {
    let path = config
        .selected_path()
        .ok_or(Error::NoStoreSelected)
        .context("open database")?;
    RedbStore::open(path).context("open database")
}
