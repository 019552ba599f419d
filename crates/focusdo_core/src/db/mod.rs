//! Local plan database: connection bootstrap and schema versioning.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Plan rows are only touched through a connection on `latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or using the plan database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// Connection was handed over without running migrations.
    SchemaBehind { found: u32, required: u32 },
    /// One migration step failed; the transaction was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl DbError {
    /// Short machine-readable code for `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::SchemaTooNew { .. } => "schema_too_new",
            Self::SchemaBehind { .. } => "schema_behind",
            Self::Migration { .. } => "migration_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "plan database is at schema {found}, this build reads up to {supported}"
            ),
            Self::SchemaBehind { found, required } => write!(
                f,
                "plan database is at schema {found}, migrate to {required} first"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "plan migration {version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } | Self::SchemaBehind { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
