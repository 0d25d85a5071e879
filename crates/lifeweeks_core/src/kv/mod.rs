//! Key-value backend contract and implementations.
//!
//! # Responsibility
//! - Define the asynchronous string key-value contract the entry store
//!   persists through.
//! - Provide a SQLite-backed implementation and an in-memory one.
//!
//! # Invariants
//! - `set_item` replaces the whole value stored under a key.
//! - `remove_items` removes all listed keys or none of them.
//! - Backends never interpret values; serialization belongs to callers.

use crate::db::DbError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::MemoryKvBackend;
pub use sqlite::SqliteKvBackend;

pub type BackendResult<T> = Result<T, BackendError>;

/// Transport-level failure of a key-value backend.
#[derive(Debug)]
pub enum BackendError {
    Db(DbError),
    /// Blocking worker task panicked or was cancelled.
    Task(String),
    /// Connection lock was poisoned by a panicking writer.
    Poisoned,
    /// Backend refused the operation (offline, read-only, injected failure).
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Task(message) => write!(f, "storage worker failed: {message}"),
            Self::Poisoned => write!(f, "storage connection lock poisoned"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Asynchronous string key-value storage.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Returns the value under `key`, or `None` when absent.
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> BackendResult<()>;
    /// Removes every listed key; absent keys are ignored.
    async fn remove_items(&self, keys: &[&str]) -> BackendResult<()>;
}

#[async_trait]
impl<T: KeyValueBackend + ?Sized> KeyValueBackend for Arc<T> {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_items(&self, keys: &[&str]) -> BackendResult<()> {
        (**self).remove_items(keys).await
    }
}
