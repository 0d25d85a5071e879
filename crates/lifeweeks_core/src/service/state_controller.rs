//! Life-grid state controller.
//!
//! # Responsibility
//! - Own the in-memory cache of the profile and week entries.
//! - Run mutation actions against the entry store, then mirror them in cache.
//! - Expose the derived week grid and current week number.
//!
//! # Invariants
//! - Write-then-cache: the cache changes only after the store write
//!   succeeded. A failed write leaves the cache at its last durable value.
//! - Mutations take `&mut self`; one controller runs one action at a time.
//! - Content actions require a saved profile and reject stale week/todo
//!   references instead of ignoring them.
//! - Derived views are recomputed from the cache on every read.

use crate::calendar::clock::Clock;
use crate::calendar::week_calculator::{
    all_weeks, current_week_number, total_weeks, validate_birth_date, validate_life_expectancy,
    week_by_number, week_dates,
};
use crate::config::ProfileRules;
use crate::kv::KeyValueBackend;
use crate::model::entry::{Todo, TodoId, WeekEntry, WeekNumber};
use crate::model::profile::{Profile, ProfileUpdate, ProfileValidationError};
use crate::model::week::Week;
use crate::repo::entry_store::{EntryMap, EntryStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors surfaced by controller actions.
#[derive(Debug)]
pub enum ControllerError {
    /// Action needs a profile but onboarding has not happened.
    NoProfile,
    /// Referenced week has no entry; the caller holds stale state.
    EntryNotFound(WeekNumber),
    TodoNotFound {
        week_number: WeekNumber,
        todo_id: TodoId,
    },
    /// Week numbers start at 1.
    InvalidWeekNumber(WeekNumber),
    Validation(ProfileValidationError),
    /// Persistence failure; the cache was left untouched.
    Store(StoreError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProfile => write!(f, "no profile found"),
            Self::EntryNotFound(week_number) => write!(f, "week entry not found: {week_number}"),
            Self::TodoNotFound {
                week_number,
                todo_id,
            } => write!(f, "todo {todo_id} not found in week {week_number}"),
            Self::InvalidWeekNumber(week_number) => {
                write!(f, "invalid week number: {week_number}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::EntryNotFound(week_number) => Self::EntryNotFound(week_number),
            StoreError::ProfileNotFound => Self::NoProfile,
            other => Self::Store(other),
        }
    }
}

impl From<ProfileValidationError> for ControllerError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Single owner of life-grid state, constructed once and passed to consumers.
pub struct StateController<B: KeyValueBackend> {
    store: EntryStore<B>,
    clock: Arc<dyn Clock>,
    rules: ProfileRules,
    profile: Option<Profile>,
    entries: EntryMap,
    is_loading: bool,
}

impl<B: KeyValueBackend> StateController<B> {
    /// Creates a controller with an empty cache in the loading state.
    ///
    /// Call [`StateController::load`] before reading state.
    pub fn new(store: EntryStore<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            rules: ProfileRules::default(),
            profile: None,
            entries: EntryMap::new(),
            is_loading: true,
        }
    }

    /// Overrides the onboarding validation rules.
    pub fn with_rules(mut self, rules: ProfileRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn store(&self) -> &EntryStore<B> {
        &self.store
    }

    /// Loads profile and entries concurrently into the cache.
    ///
    /// The cache is replaced only when both reads succeed. The loading flag
    /// is cleared either way.
    pub async fn load(&mut self) -> ControllerResult<()> {
        let started_at = Instant::now();
        self.is_loading = true;
        let loaded = tokio::try_join!(self.store.get_profile(), self.store.get_all_entries());
        self.is_loading = false;

        let (profile, entries) = loaded.map_err(|err| {
            error!(
                "event=state_load module=controller status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            ControllerError::from(err)
        })?;

        info!(
            "event=state_load module=controller status=ok profile_exists={} entry_count={} duration_ms={}",
            profile.is_some(),
            entries.len(),
            started_at.elapsed().as_millis()
        );
        self.profile = profile;
        self.entries = entries;
        Ok(())
    }

    /// Re-reads both records from storage.
    pub async fn refresh(&mut self) -> ControllerResult<()> {
        self.load().await
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    pub fn get_week_entry(&self, week_number: WeekNumber) -> Option<&WeekEntry> {
        self.entries.get(&week_number)
    }

    /// Full life grid; empty before onboarding.
    pub fn weeks(&self) -> Vec<Week> {
        match &self.profile {
            Some(profile) => all_weeks(
                profile.birth_date,
                profile.life_expectancy_years,
                &self.entries,
                self.clock.today(),
            ),
            None => Vec::new(),
        }
    }

    /// 1-based current week; `None` before onboarding.
    pub fn current_week_number(&self) -> Option<i64> {
        self.profile
            .as_ref()
            .map(|profile| current_week_number(profile.birth_date, self.clock.today()))
    }

    /// Grid cell for today, when today lies inside the grid.
    pub fn current_week(&self) -> Option<Week> {
        let profile = self.profile.as_ref()?;
        let current = self.current_week_number()?;
        let week_number = WeekNumber::try_from(current).ok()?;
        if !(1..=total_weeks(profile.life_expectancy_years)).contains(&week_number) {
            return None;
        }
        self.week(week_number)
    }

    /// Grid cell for any week number; `None` before onboarding.
    pub fn week(&self, week_number: WeekNumber) -> Option<Week> {
        let profile = self.profile.as_ref()?;
        Some(week_by_number(
            profile.birth_date,
            week_number,
            &self.entries,
            self.clock.today(),
        ))
    }

    /// Validates onboarding input and saves the resulting profile.
    ///
    /// # Errors
    /// - `Validation` with a reason when either input is rejected; nothing is
    ///   written in that case.
    pub async fn complete_onboarding(
        &mut self,
        birth_date_input: &str,
        life_expectancy_years: u32,
    ) -> ControllerResult<Profile> {
        let birth_date = validate_birth_date(birth_date_input, self.clock.today(), &self.rules)
            .inspect_err(|err| {
                warn!("event=onboarding module=controller status=rejected reason={err}");
            })?;
        let years = validate_life_expectancy(life_expectancy_years, &self.rules)?;

        let profile = Profile::new(birth_date, years, self.clock.now());
        self.save_profile(profile.clone()).await?;
        Ok(profile)
    }

    /// Replaces the profile.
    pub async fn save_profile(&mut self, profile: Profile) -> ControllerResult<()> {
        self.store.save_profile(&profile).await?;
        self.profile = Some(profile);
        Ok(())
    }

    /// Applies a partial update to the cached profile.
    ///
    /// # Errors
    /// - `NoProfile` before onboarding.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> ControllerResult<Profile> {
        let updated = self
            .profile
            .as_ref()
            .ok_or(ControllerError::NoProfile)?
            .merged(update);
        self.store.save_profile(&updated).await?;
        self.profile = Some(updated.clone());
        Ok(updated)
    }

    /// Inserts or replaces an entry under its week number.
    pub async fn save_entry(&mut self, entry: WeekEntry) -> ControllerResult<()> {
        ensure_week_number(entry.week_number)?;
        self.store.save_entry(&entry).await?;
        self.entries.insert(entry.week_number, entry);
        Ok(())
    }

    /// Deletes the entry for a week and returns it.
    ///
    /// # Errors
    /// - `EntryNotFound` when the week has no entry. A cached entry that is
    ///   already gone from storage is dropped from the cache as well.
    pub async fn delete_entry(&mut self, week_number: WeekNumber) -> ControllerResult<WeekEntry> {
        if !self.entries.contains_key(&week_number) {
            return Err(ControllerError::EntryNotFound(week_number));
        }
        let removed = match self.store.delete_entry(week_number).await {
            Ok(removed) => removed,
            Err(StoreError::EntryNotFound(_)) => {
                self.entries.remove(&week_number);
                warn!("event=entry_delete module=controller status=stale week={week_number}");
                return Err(ControllerError::EntryNotFound(week_number));
            }
            Err(err) => return Err(err.into()),
        };
        self.entries.remove(&week_number);
        info!("event=entry_delete module=controller status=ok week={week_number}");
        Ok(removed)
    }

    /// Appends an open todo, creating the week entry when needed.
    pub async fn add_todo(
        &mut self,
        week_number: WeekNumber,
        text: impl Into<String>,
    ) -> ControllerResult<Todo> {
        let now = self.clock.now();
        let mut entry = self.entry_or_new(week_number)?;
        let todo = Todo::new(text, now);
        entry.todos.push(todo.clone());
        entry.touch(now);

        self.save_entry(entry).await?;
        info!(
            "event=todo_add module=controller status=ok week={week_number} todo_id={}",
            todo.id
        );
        Ok(todo)
    }

    /// Flips completion of one todo and returns its new state.
    ///
    /// # Errors
    /// - `EntryNotFound` / `TodoNotFound` for stale references.
    pub async fn toggle_todo(
        &mut self,
        week_number: WeekNumber,
        todo_id: TodoId,
    ) -> ControllerResult<Todo> {
        let now = self.clock.now();
        let mut entry = self.existing_entry(week_number)?;
        let todo = entry.todo_mut(todo_id).ok_or(ControllerError::TodoNotFound {
            week_number,
            todo_id,
        })?;
        todo.toggle(now);
        let toggled = todo.clone();
        entry.touch(now);

        self.save_entry(entry).await?;
        Ok(toggled)
    }

    /// Removes one todo and returns it.
    ///
    /// # Errors
    /// - `EntryNotFound` / `TodoNotFound` for stale references.
    pub async fn delete_todo(
        &mut self,
        week_number: WeekNumber,
        todo_id: TodoId,
    ) -> ControllerResult<Todo> {
        let now = self.clock.now();
        let mut entry = self.existing_entry(week_number)?;
        let removed = entry
            .remove_todo(todo_id)
            .ok_or(ControllerError::TodoNotFound {
                week_number,
                todo_id,
            })?;
        entry.touch(now);

        self.save_entry(entry).await?;
        Ok(removed)
    }

    /// Replaces the journal text, creating the week entry when needed.
    pub async fn update_journal(
        &mut self,
        week_number: WeekNumber,
        journal: impl Into<String>,
    ) -> ControllerResult<()> {
        let now = self.clock.now();
        let mut entry = self.entry_or_new(week_number)?;
        entry.journal = journal.into();
        entry.touch(now);

        self.save_entry(entry).await
    }

    /// Removes every persisted record, then empties the cache.
    pub async fn clear_all_data(&mut self) -> ControllerResult<()> {
        self.store.clear_all().await?;
        self.profile = None;
        self.entries.clear();
        Ok(())
    }

    /// Copy of the week's entry, or a fresh empty entry spanning that week.
    fn entry_or_new(&self, week_number: WeekNumber) -> ControllerResult<WeekEntry> {
        let profile = self.profile.as_ref().ok_or(ControllerError::NoProfile)?;
        ensure_week_number(week_number)?;
        Ok(match self.entries.get(&week_number) {
            Some(entry) => entry.clone(),
            None => WeekEntry::new(
                week_number,
                week_dates(profile.birth_date, week_number),
                self.clock.now(),
            ),
        })
    }

    fn existing_entry(&self, week_number: WeekNumber) -> ControllerResult<WeekEntry> {
        if self.profile.is_none() {
            return Err(ControllerError::NoProfile);
        }
        self.entries
            .get(&week_number)
            .cloned()
            .ok_or(ControllerError::EntryNotFound(week_number))
    }
}

fn ensure_week_number(week_number: WeekNumber) -> ControllerResult<()> {
    if week_number == 0 {
        return Err(ControllerError::InvalidWeekNumber(week_number));
    }
    Ok(())
}
