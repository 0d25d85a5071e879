//! Versioned schema steps for the key-value store file.
//!
//! # Invariants
//! - Steps are listed in ascending version order and never edited once
//!   released; schema changes append a new step.
//! - All pending steps and the version bump commit together.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` in ascending order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_kv_store.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<_> = STEPS.iter().filter(|(version, _)| *version > from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=ok from={from} to={to}");
    Ok(())
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
