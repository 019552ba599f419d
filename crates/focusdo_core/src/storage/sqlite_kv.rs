//! SQLite-backed key-value store over the `kv_entries` table.
//!
//! # Invariants
//! - Callers pass a migrated connection (`open_db` / `open_db_in_memory`).
//! - `set` is an upsert; one row per key.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store persisted in the local plan database.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `DbError::SchemaBehind` for an unmigrated connection.
    /// - `DbError::SchemaTooNew` for a file written by a newer build.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        let version = current_version(&conn)?;
        let latest = latest_version();
        if version < latest {
            return Err(StorageError::Db(DbError::SchemaBehind {
                found: version,
                required: latest,
            }));
        }
        if version > latest {
            return Err(StorageError::Db(DbError::SchemaTooNew {
                found: version,
                supported: latest,
            }));
        }
        Ok(Self { conn })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Deletes one key. Returns whether a row was removed.
    pub fn remove(&mut self, key: &str) -> StorageResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}
