//! Key-value backends.
//!
//! A backend stores opaque string values under string keys and replaces the
//! whole value on every write. [`SqliteBackend`] is the durable one;
//! [`MemoryBackend`] keeps everything in process for tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::migrations;

/// Synchronous whole-value key-value storage.
pub trait Backend: Send {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// `SQLite`-backed key-value storage.
#[derive(Debug)]
pub struct SqliteBackend {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteBackend {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for SqliteBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            (key, value),
        )?;
        debug!(key, bytes = value.len(), "Wrote item");
        Ok(())
    }
}

/// In-process backend used as a test double.
///
/// Counts writes so callers can assert how often a key was persisted.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key` with a raw value without counting it as a write.
    #[must_use]
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Number of `set_item` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Backend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_open_in_memory() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        assert_eq!(backend.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_sqlite_get_missing_key() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        assert!(backend.get_item("nope").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_set_replaces_value() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.set_item("k", "one").unwrap();
        backend.set_item("k", "two").unwrap();
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_sqlite_keys_are_independent() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.set_item("a", "1").unwrap();
        backend.set_item("b", "2").unwrap();
        backend.set_item("a", "3").unwrap();
        assert_eq!(backend.get_item("a").unwrap().as_deref(), Some("3"));
        assert_eq!(backend.get_item("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_sqlite_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("bb.db");
        let backend = SqliteBackend::open(&path).unwrap();
        backend.set_item("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bb.db");
        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend.set_item("k", "kept").unwrap();
        }
        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_memory_backend_counts_writes() {
        let backend = MemoryBackend::new().with_item("seeded", "x");
        assert_eq!(backend.write_count(), 0);
        assert_eq!(backend.get_item("seeded").unwrap().as_deref(), Some("x"));

        backend.set_item("k", "v").unwrap();
        backend.set_item("k", "w").unwrap();
        assert_eq!(backend.write_count(), 2);
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("w"));
    }
}
