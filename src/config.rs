//! Persisted tool state.
//!
//! The configuration is a single JSON document holding:
//!
//! - [`Configuration::selected_path`] - the database file commands operate on
//! - per-bucket type assignments ([`BucketConfig`])
//! - the ordered list of extension modules ([`ExtensionRef`])
//!
//! Every mutation is a whole-document read-modify-write ([`Configuration::update`]).
//! There is no file locking; concurrent invocations may race.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Key type used when a bucket has no explicit key type.
pub const DEFAULT_KEY_TYPE: &str = "string";

/// Value type used when a bucket has no explicit value type.
pub const DEFAULT_VALUE_TYPE: &str = "hex";

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Absolute path of the selected database, empty when nothing is selected.
    #[serde(default)]
    pub selected_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub buckets: BTreeMap<String, BucketConfig>,
    #[serde(default, alias = "plugins", deserialize_with = "null_as_default")]
    pub extensions: Vec<ExtensionRef>,
}

/// Type assignment for one bucket. Empty names mean "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value_type: String,
}

/// Reference to an extension module on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRef {
    pub path: PathBuf,
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Configuration {
    /// Loads the configuration from `path`.
    ///
    /// A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigIo`] if the file exists but cannot be read and
    /// [`Error::ConfigParse`] if it is not a valid document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            },
            Err(source) => {
                return Err(Error::ConfigIo {
                    path: path.to_path_buf(),
                    source,
                });
            },
        };

        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the configuration to `path` as indented JSON.
    ///
    /// The document is written to a temporary file in the same directory and
    /// renamed over `path`, so readers never observe a partial write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigIo`] if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut file, self).map_err(|e| io_err(e.into()))?;
        file.write_all(b"\n").map_err(io_err)?;

        // Temp files are created 0600; keep the mode of the file being replaced.
        let permissions = match fs::metadata(path) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(_) => default_permissions(),
        };
        if let Some(permissions) = permissions {
            file.as_file().set_permissions(permissions).map_err(io_err)?;
        }
        file.persist(path).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %path.display(), "configuration written");
        Ok(())
    }

    /// Loads the configuration, applies `f` and writes the result back.
    ///
    /// Nothing is written if `f` fails.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut config = Self::load(path)?;
        f(&mut config)?;
        config.save(path)?;
        Ok(config)
    }

    /// The selected database path, if any.
    pub fn selected_path(&self) -> Option<&Path> {
        (!self.selected_path.is_empty()).then(|| Path::new(&self.selected_path))
    }

    pub fn select(&mut self, path: &Path) {
        self.selected_path = path.to_string_lossy().into_owned();
    }

    /// Effective key type for `bucket`.
    pub fn key_type(&self, bucket: &str) -> &str {
        self.buckets
            .get(bucket)
            .map(|b| b.key_type.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_KEY_TYPE)
    }

    /// Effective value type for `bucket`.
    pub fn value_type(&self, bucket: &str) -> &str {
        self.buckets
            .get(bucket)
            .map(|b| b.value_type.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_VALUE_TYPE)
    }

    pub fn set_key_type(&mut self, bucket: &str, type_name: &str) {
        self.buckets.entry(bucket.to_string()).or_default().key_type = type_name.to_string();
    }

    pub fn set_value_type(&mut self, bucket: &str, type_name: &str) {
        self.buckets.entry(bucket.to_string()).or_default().value_type = type_name.to_string();
    }

    /// Removes the bucket's type assignments. Returns false if there were none.
    pub fn clear_bucket(&mut self, bucket: &str) -> bool {
        self.buckets.remove(bucket).is_some()
    }

    pub fn add_extension(&mut self, path: PathBuf) {
        self.extensions.push(ExtensionRef { path });
    }

    /// Removes every reference to `path`. Returns false if none matched.
    pub fn remove_extension(&mut self, path: &Path) -> bool {
        let before = self.extensions.len();
        self.extensions.retain(|ext| ext.path != path);
        self.extensions.len() != before
    }
}
