//! Per-bucket type assignments.
//!
//! Type names are not required to be registered when they are assigned; an
//! unknown name is stored and reported as a warning. Rendering fails later if
//! the name is still unknown.

use anyhow::{Context, Result};
use std::path::Path;

use super::load_registry;
use crate::config::Configuration;

/// Which type of a bucket to assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Key,
    Value,
}

/// Assign `type_name` to the key or value side of `bucket`.
///
/// An empty `type_name` resets the side to its default.
pub fn execute(config_path: &Path, bucket: &str, side: Side, type_name: &str) -> Result<()> {
    Configuration::update(config_path, |c| {
        if !type_name.is_empty() {
            warn_if_unknown(c, type_name);
        }
        match side {
            Side::Key => c.set_key_type(bucket, type_name),
            Side::Value => c.set_value_type(bucket, type_name),
        }
        Ok(())
    })
    .context("update configuration")?;
    Ok(())
}

/// Remove all type assignments of `bucket`.
pub fn clear(config_path: &Path, bucket: &str) -> Result<()> {
    Configuration::update(config_path, |c| {
        if !c.clear_bucket(bucket) {
            tracing::debug!(bucket, "bucket has no configuration");
        }
        Ok(())
    })
    .context("update configuration")?;
    Ok(())
}

fn warn_if_unknown(config: &Configuration, type_name: &str) {
    match load_registry(config) {
        Ok((registry, _)) if !registry.contains(type_name) => {
            let known: Vec<_> = registry.names().collect();
            tracing::warn!(
                type_name,
                known = %known.join(", "),
                "type is not registered; listing will fail until it is"
            );
        },
        Ok(_) => {},
        Err(err) => {
            tracing::warn!(type_name, error = %format!("{err:#}"), "could not validate type");
        },
    }
}
