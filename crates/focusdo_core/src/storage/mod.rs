//! Key-value persistence facility consumed by the plan store.
//!
//! # Responsibility
//! - Define the two-call storage contract (`get`, `set`).
//! - Provide SQLite, in-memory and "no storage" implementations.
//!
//! # Invariants
//! - Implementations never interpret stored values; they are opaque text.
//! - Failures are reported as `StorageError`, never as panics.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod key;
pub mod memory_kv;
pub mod sqlite_kv;

pub use key::{StorageKey, StorageKeyError, PLAN_STORAGE_KEY};
pub use memory_kv::{MemoryKeyValueStore, UnavailableKeyValueStore};
pub use sqlite_kv::SqliteKeyValueStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage facility errors.
#[derive(Debug)]
pub enum StorageError {
    /// The host has no storage facility at all.
    Unavailable,
    /// The backend refused the write (quota, read-only media, ...).
    Rejected(String),
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage facility is unavailable"),
            Self::Rejected(reason) => write!(f, "storage write rejected: {reason}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string storage addressed by key.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
