//! SQLite-backed key-value blob store.
//!
//! # Responsibility
//! - Persist one blob per key in `kv_store`, replacing it on every save.
//!
//! # Invariants
//! - The connection has migrations applied before any read or write.

use super::{PersistResult, PersistenceAdapter, DEFAULT_STORAGE_KEY};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Device-local blob store keyed by name, one row per key.
pub struct SqliteStorage {
    conn: Connection,
    key: String,
}

impl SqliteStorage {
    /// Opens (and migrates) a database file using the default key.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Ok(Self::from_connection(open_db(path)?, DEFAULT_STORAGE_KEY))
    }

    pub fn open_in_memory() -> PersistResult<Self> {
        Ok(Self::from_connection(
            open_db_in_memory()?,
            DEFAULT_STORAGE_KEY,
        ))
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PersistenceAdapter for SqliteStorage {
    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, bytes: &[u8]) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.key.as_str(), bytes],
        )?;
        Ok(())
    }
}
