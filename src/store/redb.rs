//! Redb-backed store.
//!
//! A bucket is a redb table keyed and valued by raw bytes
//! (`TableDefinition<&[u8], &[u8]>`). Tables declared with other types are
//! still listed but cannot be walked.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError, TableHandle};
use std::path::Path;

use super::Store;
use crate::error::{Error, Result};

fn bucket_table(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Read-only view over a redb database file.
///
/// The file handle is released when the store is dropped; every operation
/// runs inside its own read transaction.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Opens an existing database file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreOpen`] if the file does not exist, is not a redb
    /// database, or is locked by another process.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::open(path).map_err(|e| Error::StoreOpen {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(Self { db })
    }

    /// Wraps an already-open database.
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }
}

impl Store for RedbStore {
    fn for_each_bucket(&self, visit: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| Error::store("begin read transaction", e))?;

        let tables = read_txn
            .list_tables()
            .map_err(|e| Error::store("list tables", e))?;

        for table in tables {
            visit(table.name())?;
        }
        Ok(())
    }

    fn for_each_entry(
        &self,
        bucket: &str,
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| Error::store("begin read transaction", e))?;

        let table = match read_txn.open_table(bucket_table(bucket)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Err(Error::bucket_not_found(bucket)),
            Err(e) => return Err(Error::store("open bucket", e)),
        };

        for item in table.iter().map_err(|e| Error::store("iterate bucket", e))? {
            let (key, value) = item.map_err(|e| Error::store("read entry", e))?;
            visit(key.value(), value.value())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(path: &Path, bucket: &str, entries: &[(&[u8], &[u8])]) {
        let db = Database::create(path).unwrap();
        let write_txn = db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(bucket_table(bucket)).unwrap();
            for (key, value) in entries {
                table.insert(*key, *value).unwrap();
            }
        }
        write_txn.commit().unwrap();
    }

    #[test]
    fn test_open_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = RedbStore::open(tmp.path().join("missing.redb")).err().unwrap();
        assert!(matches!(err, Error::StoreOpen { .. }));
    }

    #[test]
    fn test_entries_in_key_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.redb");
        seed(&path, "users", &[(b"b", b"2"), (b"a", b"1"), (b"c", b"3")]);

        let store = RedbStore::open(&path).unwrap();
        let mut keys = Vec::new();
        store
            .for_each_entry("users", &mut |key, _| {
                keys.push(key.to_vec());
                Ok(())
            })
            .unwrap();
        assert_eq!(keys, [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_lists_buckets() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.redb");
        seed(&path, "users", &[(b"k", b"v")]);

        let store = RedbStore::open(&path).unwrap();
        let mut names = Vec::new();
        store
            .for_each_bucket(&mut |name| {
                names.push(name.to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(names, ["users"]);
    }

    #[test]
    fn test_missing_bucket() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.redb");
        seed(&path, "users", &[]);

        let store = RedbStore::open(&path).unwrap();
        let err = store.for_each_entry("orders", &mut |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::BucketNotFound { name } if name == "orders"));
    }

    #[test]
    fn test_visitor_error_stops_iteration() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.redb");
        seed(&path, "users", &[(b"a", b""), (b"b", b""), (b"c", b"")]);

        let store = RedbStore::open(&path).unwrap();
        let mut seen = 0;
        let result = store.for_each_entry("users", &mut |_, _| {
            seen += 1;
            Err(Error::NoStoreSelected)
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_wraps_open_database() {
        let tmp = TempDir::new().unwrap();
        let db = Database::create(tmp.path().join("test.redb")).unwrap();
        let counters: TableDefinition<u64, u64> = TableDefinition::new("counters");
        let write_txn = db.begin_write().unwrap();
        {
            let mut users = write_txn.open_table(bucket_table("users")).unwrap();
            users.insert(&b"k"[..], &b"v"[..]).unwrap();
            let mut counters = write_txn.open_table(counters).unwrap();
            counters.insert(1u64, 2u64).unwrap();
        }
        write_txn.commit().unwrap();

        let store = RedbStore::from_database(db);
        let mut names = Vec::new();
        store
            .for_each_bucket(&mut |name| {
                names.push(name.to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(names, ["counters", "users"]);

        // Listed, but not a byte table.
        let err = store.for_each_entry("counters", &mut |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Store { context: "open bucket", .. }));
    }
}
