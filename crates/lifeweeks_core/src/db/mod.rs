//! SQLite file behind the key-value store.
//!
//! # Responsibility
//! - Hand `kv::SqliteKvBackend` a connection whose `kv_store` table exists.
//! - Refuse files written by a newer build instead of guessing their layout.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; 0 means a fresh file.
//! - The backend checks that version before its first read or write.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was migrated by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was not opened through `open_db`/`open_db_in_memory`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store file schema v{db_version} is newer than this build (v{latest_supported})"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is at schema v{actual_version}, key-value store needs v{expected_version}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
