//! Extension modules that contribute decoders.
//!
//! An extension exposes two independent, optional capabilities:
//!
//! - **types**: registers one or more decoders in the [`TypeRegistry`]
//! - **name**: a short identifier used when listing installed extensions
//!
//! Registration skips extensions without the types capability; listing
//! requires every extension to report a name. Extensions are loaded once per
//! invocation, in configuration order, and never unloaded.
//!
//! # Example
//!
//! ```ignore
//! use badm::extension::LoadedExtensions;
//! use badm::types::TypeRegistry;
//!
//! let extensions = LoadedExtensions::load_all(&config.extensions)?;
//! let mut registry = TypeRegistry::with_builtins();
//! extensions.register_all_types(&mut registry)?;
//! ```

mod wasm;

pub use wasm::WasmExtension;

use std::path::Path;

use crate::config::ExtensionRef;
use crate::error::{Error, Result};
use crate::types::TypeRegistry;

/// Capabilities a loaded extension may provide.
pub trait Extension {
    /// Path the extension was loaded from.
    fn path(&self) -> &Path;

    /// The extension's name, or `Ok(None)` if it does not report one.
    ///
    /// # Errors
    ///
    /// Returns an error if the name entry point exists but fails.
    fn name(&self) -> Result<Option<String>>;

    /// Registers the extension's decoders.
    ///
    /// Returns `Ok(false)` without touching the registry if the extension has
    /// no registration entry point.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails, including
    /// [`Error::DuplicateType`] when a name is already taken.
    fn contribute_types(&self, registry: &mut TypeRegistry) -> Result<bool>;
}

/// Extensions opened from the configuration, in configuration order.
#[derive(Default)]
pub struct LoadedExtensions {
    extensions: Vec<Box<dyn Extension>>,
}

impl LoadedExtensions {
    /// Opens every referenced module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtensionLoad`] naming the first module that cannot be
    /// opened. Nothing is returned for the modules opened before it.
    pub fn load_all(refs: &[ExtensionRef]) -> Result<Self> {
        if refs.is_empty() {
            return Ok(Self::default());
        }

        let engine = wasmtime::Engine::default();
        let extensions = refs
            .iter()
            .map(|ext| {
                WasmExtension::open(&engine, &ext.path)
                    .map(|loaded| Box::new(loaded) as Box<dyn Extension>)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = extensions.len(), "loaded extensions");
        Ok(Self { extensions })
    }

    /// Wraps extensions that are already loaded.
    pub fn from_extensions(extensions: Vec<Box<dyn Extension>>) -> Self {
        Self { extensions }
    }

    /// Runs each extension's registration in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing extension and returns its error; later
    /// extensions are not asked to register.
    pub fn register_all_types(&self, registry: &mut TypeRegistry) -> Result<()> {
        for extension in &self.extensions {
            let registered = extension.contribute_types(registry)?;
            if !registered {
                tracing::debug!(
                    path = %extension.path().display(),
                    "extension contributes no types"
                );
            }
        }
        Ok(())
    }

    /// Names of all extensions, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEntryPoint`] for the first extension that does
    /// not report a name.
    pub fn list_names(&self) -> Result<Vec<String>> {
        self.extensions
            .iter()
            .map(|extension| {
                extension.name()?.ok_or_else(|| Error::MissingEntryPoint {
                    path: extension.path().to_path_buf(),
                    entry_point: wasm::NAME_EXPORT,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
