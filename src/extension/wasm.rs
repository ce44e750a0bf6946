//! WebAssembly extensions.
//!
//! A module opts into capabilities through its exports:
//!
//! | export / import             | signature                      |
//! |-----------------------------|--------------------------------|
//! | `memory`                    | linear memory                  |
//! | `name`                      | `() -> i64`                    |
//! | `register_types`            | `() -> i32` (0 on success)     |
//! | `alloc`                     | `(len: i32) -> i32`            |
//! | `decode`                    | `(i32, i32, i32, i32) -> i64`  |
//! | import `badm.register_type` | `(ptr: i32, len: i32) -> i32`  |
//!
//! Strings cross the boundary as a packed `i64`: pointer in the high 32 bits,
//! length in the low 32 bits. `decode` receives the type name and the input
//! bytes (both written into buffers obtained from `alloc`) and returns either a
//! packed output string or, when negative, the negated packed error message.
//!
//! `register_types` calls `badm.register_type` once per type name; the host
//! registers the recorded names after the call returns successfully. A name
//! the host refuses (empty, outside guest memory, not UTF-8) makes the whole
//! registration fail, even if the guest ignores the non-zero return code.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wasmtime::{Caller, Engine, Instance, Linker, Memory, Module, Store};

use super::Extension;
use crate::error::{Error, Result};
use crate::types::{DecodeError, Decoder, TypeRegistry};

/// Export reporting the extension's name.
pub(crate) const NAME_EXPORT: &str = "name";
const REGISTER_EXPORT: &str = "register_types";
const ALLOC_EXPORT: &str = "alloc";
const DECODE_EXPORT: &str = "decode";
const MEMORY_EXPORT: &str = "memory";

/// Host import module name.
const HOST_MODULE: &str = "badm";

/// Per-instance host state.
#[derive(Default)]
struct HostState {
    /// Names reported through `badm.register_type` during `register_types`.
    pending_types: Vec<String>,
    /// First name the host refused during `register_types`.
    rejected_type: Option<String>,
}

/// Instantiated guest.
struct Guest {
    store: Store<HostState>,
    instance: Instance,
}

impl Guest {
    fn memory(&mut self) -> std::result::Result<Memory, String> {
        self.instance
            .get_memory(&mut self.store, MEMORY_EXPORT)
            .ok_or_else(|| format!("module does not export '{MEMORY_EXPORT}'"))
    }

    fn read_packed(&mut self, packed: i64) -> std::result::Result<String, String> {
        let memory = self.memory()?;
        let (ptr, len) = unpack(packed);
        read_str(memory.data(&self.store), ptr, len)
    }

    /// Copies `bytes` into a fresh guest buffer and returns its pointer.
    fn write_bytes(&mut self, bytes: &[u8]) -> std::result::Result<i32, String> {
        let len = i32::try_from(bytes.len()).map_err(|_| "input too large".to_string())?;
        let alloc = self
            .instance
            .get_typed_func::<i32, i32>(&mut self.store, ALLOC_EXPORT)
            .map_err(|e| format!("{ALLOC_EXPORT}: {e}"))?;
        let ptr = alloc
            .call(&mut self.store, len)
            .map_err(|e| format!("{ALLOC_EXPORT}: {e}"))?;

        let offset = usize::try_from(ptr).map_err(|_| format!("{ALLOC_EXPORT} returned {ptr}"))?;
        let memory = self.memory()?;
        memory
            .write(&mut self.store, offset, bytes)
            .map_err(|e| format!("write guest memory: {e}"))?;
        Ok(ptr)
    }

    fn decode(&mut self, type_name: &str, input: &[u8]) -> std::result::Result<String, DecodeError> {
        let decode = self
            .instance
            .get_typed_func::<(i32, i32, i32, i32), i64>(&mut self.store, DECODE_EXPORT)
            .map_err(|e| DecodeError::new(format!("{DECODE_EXPORT}: {e}")))?;

        let type_ptr = self.write_bytes(type_name.as_bytes()).map_err(DecodeError::new)?;
        let input_ptr = self.write_bytes(input).map_err(DecodeError::new)?;
        // Lengths were validated by write_bytes.
        let type_len = type_name.len() as i32;
        let input_len = input.len() as i32;

        let packed = decode
            .call(&mut self.store, (type_ptr, type_len, input_ptr, input_len))
            .map_err(|e| DecodeError::new(format!("{DECODE_EXPORT} trapped: {e}")))?;

        if packed >= 0 {
            self.read_packed(packed).map_err(DecodeError::new)
        } else {
            let message = packed
                .checked_neg()
                .ok_or_else(|| "invalid error pointer".to_string())
                .and_then(|p| self.read_packed(p))
                .map_err(DecodeError::new)?;
            Err(DecodeError::new(message))
        }
    }
}

fn unpack(packed: i64) -> (usize, usize) {
    let packed = packed as u64;
    ((packed >> 32) as usize, (packed & 0xffff_ffff) as usize)
}

fn read_str(data: &[u8], ptr: usize, len: usize) -> std::result::Result<String, String> {
    let bytes = ptr
        .checked_add(len)
        .and_then(|end| data.get(ptr..end))
        .ok_or_else(|| format!("string at {ptr}+{len} is outside guest memory"))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| format!("string is not UTF-8: {e}"))
}

/// Extension backed by a WebAssembly module.
pub struct WasmExtension {
    path: PathBuf,
    guest: Arc<Mutex<Guest>>,
}

impl WasmExtension {
    /// Compiles and instantiates the module at `path` (binary or text format).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtensionLoad`] if the file cannot be read, is not a
    /// valid module, or imports something the host does not provide.
    pub fn open(engine: &Engine, path: &Path) -> Result<Self> {
        let load_err = |e: wasmtime::Error| Error::extension_load(path, format!("{e:#}"));

        let module = Module::from_file(engine, path).map_err(load_err)?;

        let mut linker = Linker::new(engine);
        linker
            .func_wrap(
                HOST_MODULE,
                "register_type",
                |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| -> i32 {
                    match caller_str(&mut caller, ptr, len) {
                        Ok(name) if !name.is_empty() => {
                            caller.data_mut().pending_types.push(name);
                            0
                        },
                        Ok(_) => reject(&mut caller, "empty type name".to_string()),
                        Err(reason) => reject(&mut caller, reason),
                    }
                },
            )
            .map_err(load_err)?;

        let mut store = Store::new(engine, HostState::default());
        let instance = linker.instantiate(&mut store, &module).map_err(load_err)?;

        tracing::debug!(path = %path.display(), "opened extension");
        Ok(Self {
            path: path.to_path_buf(),
            guest: Arc::new(Mutex::new(Guest { store, instance })),
        })
    }

    fn call_err(&self, reason: impl ToString) -> Error {
        Error::extension_call(&self.path, reason)
    }
}

/// Records the first refused type name so registration fails afterwards.
fn reject(caller: &mut Caller<'_, HostState>, reason: String) -> i32 {
    tracing::warn!(%reason, "rejected type name from extension");
    caller.data_mut().rejected_type.get_or_insert(reason);
    1
}

fn caller_str(
    caller: &mut Caller<'_, HostState>,
    ptr: i32,
    len: i32,
) -> std::result::Result<String, String> {
    let memory = caller
        .get_export(MEMORY_EXPORT)
        .and_then(|export| export.into_memory())
        .ok_or_else(|| format!("module does not export '{MEMORY_EXPORT}'"))?;
    let ptr = usize::try_from(ptr).map_err(|_| format!("negative pointer {ptr}"))?;
    let len = usize::try_from(len).map_err(|_| format!("negative length {len}"))?;
    read_str(memory.data(&*caller), ptr, len)
}

impl Extension for WasmExtension {
    fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> Result<Option<String>> {
        let mut guard = self.guest.lock();
        let guest = &mut *guard;

        let Ok(name) = guest
            .instance
            .get_typed_func::<(), i64>(&mut guest.store, NAME_EXPORT)
        else {
            return Ok(None);
        };

        let packed = name
            .call(&mut guest.store, ())
            .map_err(|e| self.call_err(format!("{NAME_EXPORT} trapped: {e}")))?;
        guest.read_packed(packed).map(Some).map_err(|e| self.call_err(e))
    }

    fn contribute_types(&self, registry: &mut TypeRegistry) -> Result<bool> {
        let names = {
            let mut guard = self.guest.lock();
            let guest = &mut *guard;

            let Ok(register) = guest
                .instance
                .get_typed_func::<(), i32>(&mut guest.store, REGISTER_EXPORT)
            else {
                return Ok(false);
            };

            let state = guest.store.data_mut();
            state.pending_types.clear();
            state.rejected_type = None;

            let status = register
                .call(&mut guest.store, ())
                .map_err(|e| self.call_err(format!("{REGISTER_EXPORT} trapped: {e}")))?;
            if status != 0 {
                return Err(self.call_err(format!("{REGISTER_EXPORT} returned {status}")));
            }

            if let Some(reason) = guest.store.data_mut().rejected_type.take() {
                return Err(self.call_err(format!("type name rejected: {reason}")));
            }

            let names = std::mem::take(&mut guest.store.data_mut().pending_types);
            if !names.is_empty() {
                for export in [MEMORY_EXPORT, ALLOC_EXPORT, DECODE_EXPORT] {
                    if guest.instance.get_export(&mut guest.store, export).is_none() {
                        return Err(self.call_err(format!(
                            "registers types but does not export '{export}'"
                        )));
                    }
                }
            }
            names
        };

        for name in names {
            let guest = Arc::clone(&self.guest);
            let type_name = name.clone();
            let decoder: Decoder = Arc::new(move |bytes: &[u8]| guest.lock().decode(&type_name, bytes));
            registry.register(name, decoder)?;
        }
        tracing::debug!(path = %self.path.display(), "registered extension types");
        Ok(true)
    }
}
