//! Error types for typed error handling.
//!
//! Library code returns [`Error`]; the command layer wraps it with the name of
//! the operation that failed (via `anyhow::Context`) before it reaches the user.

use std::path::PathBuf;

use crate::types::DecodeError;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration file could not be read or written.
    #[error("configuration file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not a valid document.
    #[error("could not decode configuration {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No database file has been selected yet.
    #[error("no database file selected")]
    NoStoreSelected,

    /// Database file could not be opened.
    #[error("could not open database {path:?}: {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: redb::Error,
    },

    /// Database failure while reading.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: redb::Error,
    },

    /// Bucket does not exist in the database.
    #[error("could not find bucket {name}")]
    BucketNotFound { name: String },

    /// No decoder registered under the name.
    #[error("could not find type {name}")]
    TypeNotFound { name: String },

    /// Bytes do not conform to the assigned type.
    #[error("could not decode as {type_name}: {source}")]
    Decode {
        type_name: String,
        #[source]
        source: DecodeError,
    },

    /// A decoder with this name is already registered.
    #[error("type {name} is already registered")]
    DuplicateType { name: String },

    /// Extension module could not be opened.
    #[error("could not open extension {path:?}: {reason}")]
    ExtensionLoad { path: PathBuf, reason: String },

    /// Extension entry point trapped or reported failure.
    #[error("extension {path:?} failed: {reason}")]
    ExtensionCall { path: PathBuf, reason: String },

    /// Extension lacks an entry point the operation requires.
    #[error("extension {path:?} does not export '{entry_point}'")]
    MissingEntryPoint {
        path: PathBuf,
        entry_point: &'static str,
    },

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a store error with context.
    pub fn store(context: &'static str, source: impl Into<redb::Error>) -> Self {
        Self::Store {
            context,
            source: source.into(),
        }
    }

    /// Create an IO error with context.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Create a type not found error.
    pub fn type_not_found(name: impl Into<String>) -> Self {
        Self::TypeNotFound { name: name.into() }
    }

    /// Create a bucket not found error.
    pub fn bucket_not_found(name: impl Into<String>) -> Self {
        Self::BucketNotFound { name: name.into() }
    }

    /// Create an extension load error.
    pub fn extension_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ExtensionLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an extension call error.
    pub fn extension_call(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ExtensionCall {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
