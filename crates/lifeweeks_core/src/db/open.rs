//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for the key-value store.
//! - Configure connection pragmas and apply migrations before first use.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - File connections use WAL journaling so a crash mid-write keeps the
//!   previous record intact.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenMode {
    File,
    Memory,
}

impl OpenMode {
    fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// Parent directories are not created; callers own the storage location.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(OpenMode::File, || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(OpenMode::Memory, Connection::open_in_memory)
}

fn open_with(
    mode: OpenMode,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode={}",
        mode.label()
    );

    let mut conn = open().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode.label(),
            started_at.elapsed().as_millis(),
            err
        );
        err
    })?;

    match bootstrap_connection(&mut conn, mode) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode.label(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode.label(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, mode: OpenMode) -> DbResult<()> {
    if mode == OpenMode::File {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
    }
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
