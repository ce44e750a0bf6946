//! Rendering of buckets, keys and values as text.
//!
//! Decoders are resolved once, before the store is touched, so an unknown type
//! fails without printing anything. Rows are written as they are read: the
//! first decode failure stops the walk and the rows already written stand.

use std::io::Write;

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Decoder, TypeRegistry};

/// Applies a bucket's configured decoders to entries read from a [`Store`].
pub struct Renderer<'a> {
    config: &'a Configuration,
    registry: &'a TypeRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a Configuration, registry: &'a TypeRegistry) -> Self {
        Self { config, registry }
    }

    /// Writes `name (key-type: .. / value-type: ..)` for every bucket.
    pub fn list_buckets<S, W>(&self, store: &S, out: &mut W) -> Result<()>
    where
        S: Store + ?Sized,
        W: Write + ?Sized,
    {
        store.for_each_bucket(&mut |name| {
            writeln!(
                out,
                "{name} (key-type: {} / value-type: {})",
                self.config.key_type(name),
                self.config.value_type(name)
            )
            .map_err(|e| Error::io("write bucket", e))
        })
    }

    /// Writes one decoded key per line.
    pub fn list_keys<S, W>(&self, store: &S, bucket: &str, out: &mut W) -> Result<()>
    where
        S: Store + ?Sized,
        W: Write + ?Sized,
    {
        let key_type = self.config.key_type(bucket);
        let decode_key = self.registry.resolve(key_type)?;

        store.for_each_entry(bucket, &mut |key, _| {
            let key = apply(&decode_key, key_type, key)?;
            writeln!(out, "{key}").map_err(|e| Error::io("write key", e))
        })
    }

    /// Writes one decoded value per line.
    pub fn list_values<S, W>(&self, store: &S, bucket: &str, out: &mut W) -> Result<()>
    where
        S: Store + ?Sized,
        W: Write + ?Sized,
    {
        let value_type = self.config.value_type(bucket);
        let decode_value = self.registry.resolve(value_type)?;

        store.for_each_entry(bucket, &mut |_, value| {
            let value = apply(&decode_value, value_type, value)?;
            writeln!(out, "{value}").map_err(|e| Error::io("write value", e))
        })
    }

    /// Writes each entry as the decoded key, the decoded value and a blank line.
    pub fn list_key_values<S, W>(&self, store: &S, bucket: &str, out: &mut W) -> Result<()>
    where
        S: Store + ?Sized,
        W: Write + ?Sized,
    {
        let key_type = self.config.key_type(bucket);
        let value_type = self.config.value_type(bucket);
        let decode_key = self.registry.resolve(key_type)?;
        let decode_value = self.registry.resolve(value_type)?;

        store.for_each_entry(bucket, &mut |key, value| {
            let key = apply(&decode_key, key_type, key)?;
            let value = apply(&decode_value, value_type, value)?;
            write!(out, "{key}\n{value}\n\n").map_err(|e| Error::io("write entry", e))
        })
    }
}

fn apply(decoder: &Decoder, type_name: &str, bytes: &[u8]) -> Result<String> {
    decoder(bytes).map_err(|source| Error::Decode {
        type_name: type_name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn render<F>(f: F) -> (Result<()>, String)
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        let result = f(&mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn users_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert("users", 1u64.to_be_bytes(), "alice");
        store.insert("users", 2u64.to_be_bytes(), "bob");
        store
    }

    #[test]
    fn test_list_buckets_shows_effective_types() {
        let mut store = users_store();
        store.create_bucket("sessions");
        let mut config = Configuration::default();
        config.set_key_type("users", "uint64");
        let registry = TypeRegistry::with_builtins();

        let (result, out) = render(|out| Renderer::new(&config, &registry).list_buckets(&store, out));
        result.unwrap();
        assert_eq!(
            out,
            "sessions (key-type: string / value-type: hex)\n\
             users (key-type: uint64 / value-type: hex)\n"
        );
    }

    #[test]
    fn test_list_buckets_ignores_unknown_types() {
        let store = users_store();
        let mut config = Configuration::default();
        config.set_value_type("users", "from-missing-extension");
        let registry = TypeRegistry::with_builtins();

        let (result, out) = render(|out| Renderer::new(&config, &registry).list_buckets(&store, out));
        result.unwrap();
        assert_eq!(
            out,
            "users (key-type: string / value-type: from-missing-extension)\n"
        );
    }

    #[test]
    fn test_list_keys_and_values() {
        let store = users_store();
        let mut config = Configuration::default();
        config.set_key_type("users", "uint64");
        config.set_value_type("users", "string");
        let registry = TypeRegistry::with_builtins();
        let renderer = Renderer::new(&config, &registry);

        let (result, keys) = render(|out| renderer.list_keys(&store, "users", out));
        result.unwrap();
        assert_eq!(keys, "1\n2\n");

        let (result, values) = render(|out| renderer.list_values(&store, "users", out));
        result.unwrap();
        assert_eq!(values, "alice\nbob\n");

        let (result, pairs) = render(|out| renderer.list_key_values(&store, "users", out));
        result.unwrap();
        assert_eq!(pairs, "1\nalice\n\n2\nbob\n\n");
    }

    #[test]
    fn test_default_types() {
        let mut store = MemoryStore::new();
        store.insert("raw", "k", [0xca_u8, 0xfe]);
        let config = Configuration::default();
        let registry = TypeRegistry::with_builtins();

        let (result, out) =
            render(|out| Renderer::new(&config, &registry).list_key_values(&store, "raw", out));
        result.unwrap();
        assert_eq!(out, "k\ncafe\n\n");
    }

    #[test]
    fn test_decode_failure_stops_listing() {
        let mut store = MemoryStore::new();
        store.insert("users", [0u8, 0, 0, 0, 0, 0, 0, 1], "a");
        store.insert("users", [0u8, 0, 0, 0, 0, 0, 2], "b");
        store.insert("users", [0u8, 0, 0, 0, 0, 0, 3, 0], "c");
        let mut config = Configuration::default();
        config.set_key_type("users", "uint64");
        let registry = TypeRegistry::with_builtins();

        let (result, out) =
            render(|out| Renderer::new(&config, &registry).list_keys(&store, "users", out));
        assert_eq!(out, "1\n");
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Decode { ref type_name, .. } if type_name == "uint64"));
    }

    #[test]
    fn test_value_decode_failure_in_pairs() {
        let mut store = MemoryStore::new();
        store.insert("counters", "a", 1u64.to_be_bytes());
        store.insert("counters", "b", [1u8, 2, 3]);
        let mut config = Configuration::default();
        config.set_value_type("counters", "uint64");
        let registry = TypeRegistry::with_builtins();

        let (result, out) =
            render(|out| Renderer::new(&config, &registry).list_key_values(&store, "counters", out));
        assert_eq!(out, "a\n1\n\n");
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_unknown_type_prints_nothing() {
        let store = users_store();
        let mut config = Configuration::default();
        config.set_value_type("users", "missing");
        let registry = TypeRegistry::with_builtins();
        let renderer = Renderer::new(&config, &registry);

        let (result, out) = render(|out| renderer.list_values(&store, "users", out));
        assert!(out.is_empty());
        assert!(matches!(result, Err(Error::TypeNotFound { ref name }) if name == "missing"));

        // Keys still work; only the value side is unresolvable.
        let (result, _) = render(|out| renderer.list_keys(&store, "users", out));
        assert!(result.is_ok());

        let (result, out) = render(|out| renderer.list_key_values(&store, "users", out));
        assert!(out.is_empty());
        assert!(matches!(result, Err(Error::TypeNotFound { .. })));
    }

    #[test]
    fn test_missing_bucket() {
        let store = users_store();
        let config = Configuration::default();
        let registry = TypeRegistry::with_builtins();

        let (result, _) =
            render(|out| Renderer::new(&config, &registry).list_keys(&store, "orders", out));
        assert!(matches!(result, Err(Error::BucketNotFound { .. })));
    }
}
