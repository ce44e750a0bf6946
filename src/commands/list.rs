//! Listing commands.
//!
//! - `badm buckets` - buckets with their effective types
//! - `badm keys <bucket>` / `values` / `key-values` - decoded entries
//! - `badm types` - registered type names

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::{load_registry, open_database, read_configuration};
use crate::render::Renderer;
use crate::types::TypeRegistry;

/// Which side of each entry to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entries {
    Keys,
    Values,
    KeyValues,
}

/// List buckets with their effective key and value types.
///
/// Decodes nothing, so extensions are not loaded.
pub fn buckets<W: Write>(config_path: &Path, out: &mut W) -> Result<()> {
    let config = read_configuration(config_path)?;
    let registry = TypeRegistry::new();
    let store = open_database(&config)?;

    Renderer::new(&config, &registry)
        .list_buckets(&store, out)
        .context("list buckets")
}

/// List the decoded entries of `bucket`.
pub fn entries<W: Write>(
    config_path: &Path,
    bucket: &str,
    which: Entries,
    out: &mut W,
) -> Result<()> {
    let config = read_configuration(config_path)?;
    let (registry, _extensions) = load_registry(&config)?;
    let store = open_database(&config)?;

    let renderer = Renderer::new(&config, &registry);
    match which {
        Entries::Keys => renderer.list_keys(&store, bucket, out).context("list keys"),
        Entries::Values => renderer.list_values(&store, bucket, out).context("list values"),
        Entries::KeyValues => renderer
            .list_key_values(&store, bucket, out)
            .context("list key values"),
    }
}

/// List every registered type name, built-in and extension-provided.
pub fn types<W: Write>(config_path: &Path, out: &mut W) -> Result<()> {
    let config = read_configuration(config_path)?;
    let (registry, _extensions) = load_registry(&config)?;

    for name in registry.names() {
        writeln!(out, "{name}").context("list types")?;
    }
    Ok(())
}
