//! Entry store over a key-value backend.
//!
//! # Responsibility
//! - Persist the profile record and the week-entry collection record.
//! - Own the JSON layout of both records.
//!
//! # Invariants
//! - The entry collection is stored as an array of `[week_number, entry]`
//!   pairs so numeric keys round-trip without string coercion.
//! - Every entry mutation rewrites the whole collection (read-modify-write).
//!   Two overlapping mutations can lose one update; callers must serialize
//!   writes.
//! - Read paths reject inconsistent persisted data instead of masking it.

use crate::config::{ENTRIES_STORAGE_KEY, PROFILE_STORAGE_KEY};
use crate::kv::{BackendError, KeyValueBackend};
use crate::model::entry::{WeekEntry, WeekNumber};
use crate::model::profile::{Profile, ProfileUpdate};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Week entries keyed by week number.
pub type EntryMap = BTreeMap<WeekNumber, WeekEntry>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Backend(BackendError),
    Serialization(serde_json::Error),
    /// Persisted JSON parsed but violates collection invariants.
    InvalidData(String),
    EntryNotFound(WeekNumber),
    ProfileNotFound,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "record serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::EntryNotFound(week_number) => {
                write!(f, "week entry not found: {week_number}")
            }
            Self::ProfileNotFound => write!(f, "profile not found"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for StoreError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Presence summary of the persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    pub profile_exists: bool,
    pub entry_count: usize,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    profile: Option<&'a Profile>,
    entries: Vec<(WeekNumber, &'a WeekEntry)>,
    exported_at: DateTime<Utc>,
}

/// Persistence facade for profile and week entries.
pub struct EntryStore<B: KeyValueBackend> {
    backend: B,
}

impl<B: KeyValueBackend> EntryStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the profile, or `None` before onboarding.
    pub async fn get_profile(&self) -> StoreResult<Option<Profile>> {
        let raw = self.backend.get_item(PROFILE_STORAGE_KEY).await?;
        raw.map(|json| serde_json::from_str::<Profile>(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    /// Replaces the persisted profile wholesale.
    pub async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        let json = serde_json::to_string(profile)?;
        self.backend.set_item(PROFILE_STORAGE_KEY, json).await?;
        info!("event=profile_save module=store status=ok");
        Ok(())
    }

    /// Merges `update` into the persisted profile and writes it back.
    ///
    /// # Errors
    /// - `ProfileNotFound` when no profile has been saved yet.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> StoreResult<Profile> {
        let existing = self
            .get_profile()
            .await?
            .ok_or(StoreError::ProfileNotFound)?;
        let updated = existing.merged(update);
        self.save_profile(&updated).await?;
        Ok(updated)
    }

    /// Loads the full entry collection.
    pub async fn get_all_entries(&self) -> StoreResult<EntryMap> {
        let Some(json) = self.backend.get_item(ENTRIES_STORAGE_KEY).await? else {
            return Ok(EntryMap::new());
        };
        let pairs: Vec<(WeekNumber, WeekEntry)> = serde_json::from_str(&json)?;
        collect_entries(pairs)
    }

    pub async fn get_entry(&self, week_number: WeekNumber) -> StoreResult<Option<WeekEntry>> {
        Ok(self.get_all_entries().await?.remove(&week_number))
    }

    pub async fn has_entry(&self, week_number: WeekNumber) -> StoreResult<bool> {
        Ok(self.get_all_entries().await?.contains_key(&week_number))
    }

    /// Inserts or replaces `entry` under its week number.
    pub async fn save_entry(&self, entry: &WeekEntry) -> StoreResult<()> {
        let started_at = Instant::now();
        let mut entries = self.get_all_entries().await?;
        entries.insert(entry.week_number, entry.clone());
        self.write_entries(&entries).await.inspect_err(|err| {
            error!(
                "event=entry_save module=store status=error week={} error={}",
                entry.week_number, err
            );
        })?;
        debug!(
            "event=entry_save module=store status=ok week={} todo_count={} entry_count={} duration_ms={}",
            entry.week_number,
            entry.todos.len(),
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes the entry for `week_number` and returns it.
    ///
    /// # Errors
    /// - `EntryNotFound` when no entry exists; the collection is not rewritten.
    pub async fn delete_entry(&self, week_number: WeekNumber) -> StoreResult<WeekEntry> {
        let mut entries = self.get_all_entries().await?;
        let removed = entries
            .remove(&week_number)
            .ok_or(StoreError::EntryNotFound(week_number))?;
        self.write_entries(&entries).await?;
        debug!(
            "event=entry_delete module=store status=ok week={} entry_count={}",
            week_number,
            entries.len()
        );
        Ok(removed)
    }

    /// Removes both persisted records.
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.backend
            .remove_items(&[PROFILE_STORAGE_KEY, ENTRIES_STORAGE_KEY])
            .await?;
        info!("event=store_clear module=store status=ok");
        Ok(())
    }

    pub async fn storage_info(&self) -> StoreResult<StorageInfo> {
        let profile = self.get_profile().await?;
        let entries = self.get_all_entries().await?;
        Ok(StorageInfo {
            profile_exists: profile.is_some(),
            entry_count: entries.len(),
        })
    }

    /// Renders both records as one pretty-printed JSON backup document.
    pub async fn export_data(&self, exported_at: DateTime<Utc>) -> StoreResult<String> {
        let profile = self.get_profile().await?;
        let entries = self.get_all_entries().await?;
        let document = ExportDocument {
            profile: profile.as_ref(),
            entries: entries.iter().map(|(key, entry)| (*key, entry)).collect(),
            exported_at,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    async fn write_entries(&self, entries: &EntryMap) -> StoreResult<()> {
        let pairs: Vec<(WeekNumber, &WeekEntry)> =
            entries.iter().map(|(key, entry)| (*key, entry)).collect();
        let json = serde_json::to_string(&pairs)?;
        self.backend.set_item(ENTRIES_STORAGE_KEY, json).await?;
        Ok(())
    }
}

fn collect_entries(pairs: Vec<(WeekNumber, WeekEntry)>) -> StoreResult<EntryMap> {
    let mut entries = EntryMap::new();
    for (key, entry) in pairs {
        if key != entry.week_number {
            return Err(StoreError::InvalidData(format!(
                "entry keyed {key} carries week_number {}",
                entry.week_number
            )));
        }
        if entries.insert(key, entry).is_some() {
            return Err(StoreError::InvalidData(format!(
                "duplicate entry for week {key}"
            )));
        }
    }
    Ok(entries)
}
