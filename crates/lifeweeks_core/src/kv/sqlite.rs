//! SQLite-backed key-value backend.
//!
//! # Invariants
//! - All SQLite calls run on the blocking pool, never on an async worker.
//! - One connection is shared behind a mutex; calls are serialized.
//! - `remove_items` runs in a single transaction.

use super::{BackendError, BackendResult, KeyValueBackend};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Key-value backend persisting into the `kv_store` table.
#[derive(Debug, Clone)]
pub struct SqliteKvBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKvBackend {
    /// Wraps a connection that already went through `open_db`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema is not fully migrated.
    pub fn try_new(conn: Connection) -> DbResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(&conn)?;
        if actual_version != expected_version {
            return Err(DbError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    async fn with_conn<T, F>(&self, op: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| BackendError::Poisoned)?;
            op(&mut guard).map_err(BackendError::from)
        })
        .await
        .map_err(|err| BackendError::Task(err.to_string()))?
    }
}

#[async_trait]
impl KeyValueBackend for SqliteKvBackend {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
        .await
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value)
                 VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove_items(&self, keys: &[&str]) -> BackendResult<()> {
        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            for key in &keys {
                tx.execute("DELETE FROM kv_store WHERE key = ?1;", [key.as_str()])?;
            }
            tx.commit()
        })
        .await
    }
}
