//! SQLite blob storage.

use crate::error::Result;
use crate::storage::schema::apply_schema;
use crate::storage::BlobStore;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// How long a write waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed key-value slot storage.
#[derive(Debug)]
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Open a database at the given path.
    ///
    /// Creates the parent directory and the database, and applies the schema
    /// if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Last write time of a key in Unix milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let at = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(at)
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_memory() {
        let storage = SqliteBlobStore::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_open_creates_parent_and_sets_busy_timeout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ids.db");
        let storage = SqliteBlobStore::open(&path).unwrap();
        assert!(path.exists());

        let ms: i64 = storage
            .conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ms, 5000);
    }

    #[test]
    fn test_get_missing_key() {
        let storage = SqliteBlobStore::open_memory().unwrap();
        assert_eq!(storage.get("absent").unwrap(), None);
        assert_eq!(storage.updated_at("absent").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites_whole_value() {
        let mut storage = SqliteBlobStore::open_memory().unwrap();

        storage.set("slot", r#"{"1":{"type":"2"}}"#).unwrap();
        storage.set("slot", "{}").unwrap();

        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("{}"));
        assert!(storage.updated_at("slot").unwrap().is_some());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        {
            let mut storage = SqliteBlobStore::open(&db_path).unwrap();
            storage.set("slot", "value").unwrap();
        }

        let storage = SqliteBlobStore::open(&db_path).unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("value"));
    }
}
