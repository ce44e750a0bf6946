//! Read-only access to the embedded database.
//!
//! The renderer only needs two primitives: enumerate bucket names and walk a
//! bucket's entries in order. Both are visitor-based so that a failure inside
//! the visitor stops iteration immediately and nothing is buffered.
//!
//! - **RedbStore**: redb database file (what the CLI uses)
//! - **MemoryStore**: ordered in-memory buckets (tests and embedding)

mod memory;
mod redb;

pub use self::memory::MemoryStore;
pub use self::redb::RedbStore;

use crate::error::Result;

/// Visitor-style access to buckets and their entries.
pub trait Store {
    /// Calls `visit` with each bucket name in store order.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `visit`, or a store failure.
    fn for_each_bucket(&self, visit: &mut dyn FnMut(&str) -> Result<()>) -> Result<()>;

    /// Calls `visit` with each `(key, value)` of `bucket` in store order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::BucketNotFound`] if the bucket does not
    /// exist, otherwise propagates the first error returned by `visit`.
    fn for_each_entry(
        &self,
        bucket: &str,
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()>;
}
