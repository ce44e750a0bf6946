//! Type registry: named decoders that turn raw bytes into printable text.
//!
//! A [`TypeRegistry`] is built once per invocation. It starts with the
//! built-in decoders ([`builtin`]), is extended by extensions during the load
//! phase, and is only borrowed immutably once rendering starts.
//!
//! # Example
//!
//! ```
//! use badm::types::TypeRegistry;
//!
//! let registry = TypeRegistry::with_builtins();
//! let hex = registry.resolve("hex").unwrap();
//! assert_eq!(hex(&[0xde, 0xad, 0xbe, 0xef]).unwrap(), "deadbeef");
//! ```

pub mod builtin;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Decoder failure for a single byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct DecodeError {
    reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Maps a byte sequence to its text representation.
///
/// Decoders must be deterministic. They are shared (`Arc`) so that the
/// renderer can hold one while the registry stays borrowed.
pub type Decoder = Arc<dyn Fn(&[u8]) -> std::result::Result<String, DecodeError> + Send + Sync>;

/// Registry of decoders keyed by type name.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    decoders: BTreeMap<String, Decoder>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with `string`, `hex`, `base64` and `uint64`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, decoder) in builtin::decoders() {
            // Built-in names are distinct, so seeding an empty registry cannot collide.
            registry.decoders.insert(name.to_string(), decoder);
        }
        registry
    }

    /// Adds a decoder under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if the name is taken. The existing
    /// decoder stays registered.
    pub fn register(&mut self, name: impl Into<String>, decoder: Decoder) -> Result<()> {
        let name = name.into();
        if self.decoders.contains_key(&name) {
            return Err(Error::DuplicateType { name });
        }
        tracing::debug!(type_name = %name, "registered type");
        self.decoders.insert(name, decoder);
        Ok(())
    }

    /// Returns the decoder registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Decoder> {
        self.decoders
            .get(name)
            .cloned()
            .ok_or_else(|| Error::type_not_found(name))
    }

    /// Returns true if a decoder is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
