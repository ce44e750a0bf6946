//! In-memory store.
//!
//! Buckets and entries are kept in `BTreeMap`s, so iteration order matches
//! redb's byte ordering.

use std::collections::BTreeMap;

use super::Store;
use crate::error::{Error, Result};

/// Ordered in-memory buckets. Ideal for testing and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    buckets: BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `bucket` if it does not exist yet.
    pub fn create_bucket(&mut self, bucket: &str) {
        self.buckets.entry(bucket.to_string()).or_default();
    }

    /// Inserts an entry, creating the bucket on demand.
    pub fn insert(&mut self, bucket: &str, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }
}

impl Store for MemoryStore {
    fn for_each_bucket(&self, visit: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        for name in self.buckets.keys() {
            visit(name)?;
        }
        Ok(())
    }

    fn for_each_entry(
        &self,
        bucket: &str,
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        let entries = self
            .buckets
            .get(bucket)
            .ok_or_else(|| Error::bucket_not_found(bucket))?;

        for (key, value) in entries {
            visit(key, value)?;
        }
        Ok(())
    }
}
