// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//
// redb-backed persistent storage backend.
//
// Uses redb (pure Rust, B-tree, ACID, single-file database) as the durable
// local-storage tier of a candidate list. No C/C++ dependencies — builds on
// any platform with a Rust toolchain.
//
// # Design
//
// - Single redb `Database` file containing one main table of string pairs.
// - Read transactions for `read`/`each`; a table that does not exist yet
//   simply means nothing has been written.
// - Write transactions for `write`/`remove`; `clear_all` drops the main
//   table, which recreates itself on the next write.
// - Opening can fail (locked file, unwritable path); the liveness probe
//   turns that kind of trouble into plain fallback at selection time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableDatabase, TableDefinition};
use tracing::debug;

use crate::backend::Backend;
use crate::error::BackendError;

/// Table definition for the main key-value store.
///
/// Keys and values are strings, matching the facade's string-only storage
/// model.
const MAIN_TABLE: TableDefinition<&str, &str> = TableDefinition::new("main");

/// A persistent storage backend powered by redb.
///
/// Each `RedbBackend` wraps a single database file. `Database` is
/// `Send + Sync` and handles internal locking, so one backend may serve
/// several namespaced facades concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use strata_store::redb_backend::RedbBackend;
/// use strata_store::backend::Backend;
///
/// let backend = RedbBackend::open("/tmp/strata.redb").unwrap();
/// backend.write(&[("hello", "world")]).unwrap();
/// assert_eq!(backend.read("hello").unwrap(), Some("world".to_string()));
/// ```
pub struct RedbBackend {
    /// The redb database handle.
    db: Arc<Database>,
    /// Path to the database file (for diagnostics).
    path: PathBuf,
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    ///
    /// Creates parent directories if they don't exist. The main table is
    /// created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(BackendError::Io)?;
        }

        let db = Database::create(&path).map_err(|e| {
            BackendError::Unavailable(format!("failed to open redb at {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "opened redb backend");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Return the filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish()
    }
}

impl Backend for RedbBackend {
    fn write(&self, entries: &[(&str, &str)]) -> Result<(), BackendError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| BackendError::Unavailable(format!("write txn: {e}")))?;
        {
            let mut table = txn
                .open_table(MAIN_TABLE)
                .map_err(|e| BackendError::Unavailable(format!("open table: {e}")))?;
            for (key, value) in entries {
                table
                    .insert(*key, *value)
                    .map_err(|e| BackendError::Other(format!("insert: {e}")))?;
            }
        }
        txn.commit()
            .map_err(|e| BackendError::Other(format!("commit: {e}")))?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| BackendError::Unavailable(format!("read txn: {e}")))?;

        let table = match txn.open_table(MAIN_TABLE) {
            Ok(t) => t,
            // Table doesn't exist yet — no data has been written.
            Err(_) => return Ok(None),
        };

        match table.get(key) {
            Ok(Some(value)) => Ok(Some(value.value().to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(BackendError::Other(format!("get: {e}"))),
        }
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| BackendError::Unavailable(format!("write txn: {e}")))?;
        {
            let mut table = txn
                .open_table(MAIN_TABLE)
                .map_err(|e| BackendError::Unavailable(format!("open table: {e}")))?;
            table
                .remove(key)
                .map_err(|e| BackendError::Other(format!("remove: {e}")))?;
        }
        txn.commit()
            .map_err(|e| BackendError::Other(format!("commit: {e}")))?;
        Ok(())
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &str)) -> Result<(), BackendError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| BackendError::Unavailable(format!("read txn: {e}")))?;

        let table = match txn.open_table(MAIN_TABLE) {
            Ok(t) => t,
            Err(_) => return Ok(()), // Table doesn't exist yet
        };

        let iter = table
            .range::<&str>(..)
            .map_err(|e| BackendError::Other(format!("range scan: {e}")))?;

        for entry in iter {
            let (key, value) =
                entry.map_err(|e| BackendError::Other(format!("scan entry: {e}")))?;
            visit(key.value(), value.value());
        }

        Ok(())
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| BackendError::Unavailable(format!("write txn: {e}")))?;
        txn.delete_table(MAIN_TABLE)
            .map_err(|e| BackendError::Other(format!("delete table: {e}")))?;
        txn.commit()
            .map_err(|e| BackendError::Other(format!("commit: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "redb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Create a temporary RedbBackend for testing.
    ///
    /// Uses `tempdir()` so the directory outlives the backend for the whole
    /// test; the file is cleaned up when the TempDir drops.
    fn temp_backend() -> (RedbBackend, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.redb");
        let backend = RedbBackend::open(&path).unwrap();
        (backend, dir)
    }

    #[test]
    fn test_basic_crud() {
        let (backend, _dir) = temp_backend();

        // Read on empty store returns None.
        assert_eq!(backend.read("key1").unwrap(), None);

        // Write and read.
        backend.write(&[("key1", "value1")]).unwrap();
        assert_eq!(backend.read("key1").unwrap(), Some("value1".to_string()));

        // Overwrite.
        backend.write(&[("key1", "updated")]).unwrap();
        assert_eq!(backend.read("key1").unwrap(), Some("updated".to_string()));

        // Remove.
        backend.remove("key1").unwrap();
        assert_eq!(backend.read("key1").unwrap(), None);

        // Removing an absent key is fine.
        backend.remove("nonexistent").unwrap();
    }

    #[test]
    fn test_batched_write_is_one_transaction() {
        let (backend, _dir) = temp_backend();

        backend
            .write(&[("x", "10"), ("y", "20"), ("z", "30")])
            .unwrap();

        assert_eq!(backend.read("x").unwrap(), Some("10".to_string()));
        assert_eq!(backend.read("y").unwrap(), Some("20".to_string()));
        assert_eq!(backend.read("z").unwrap(), Some("30".to_string()));
    }

    #[test]
    fn test_each_on_empty_store() {
        let (backend, _dir) = temp_backend();
        let mut visited = 0;
        backend.each(&mut |_, _| visited += 1).unwrap();
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_each_visits_in_key_order() {
        let (backend, _dir) = temp_backend();
        backend
            .write(&[("b", "2"), ("a", "1"), ("c", "3")])
            .unwrap();

        let mut keys = Vec::new();
        backend.each(&mut |k, _| keys.push(k.to_string())).unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_all() {
        let (backend, _dir) = temp_backend();
        backend.write(&[("a", "1"), ("b", "2")]).unwrap();
        backend.clear_all().unwrap();
        assert_eq!(backend.read("a").unwrap(), None);

        // The store remains usable after the table is dropped.
        backend.write(&[("c", "3")]).unwrap();
        assert_eq!(backend.read("c").unwrap(), Some("3".to_string()));
    }

    #[test]
    fn test_name() {
        let (backend, _dir) = temp_backend();
        assert_eq!(backend.name(), "redb");
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("persist-test.redb");

        // Write data and drop.
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend
                .write(&[("persistent-key", "persistent-value")])
                .unwrap();
        }

        // Reopen and verify data survived.
        {
            let backend = RedbBackend::open(&path).unwrap();
            assert_eq!(
                backend.read("persistent-key").unwrap(),
                Some("persistent-value".to_string())
            );
        }
    }
}
