//! Core configuration and shared constants.
//!
//! # Responsibility
//! - Hold the calendar constants every week computation relies on.
//! - Hold the input-boundary rules (birth year floor, life expectancy range).
//! - Resolve runtime settings (database path, logging) from the environment.
//!
//! # Invariants
//! - `WEEKS_PER_YEAR` is a fixed 52; leap weeks are not modeled.
//! - Storage keys are stable across releases; changing them orphans user data.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Fixed year length used by the life grid.
pub const WEEKS_PER_YEAR: u32 = 52;
/// Days in one Monday-to-Sunday week.
pub const DAYS_PER_WEEK: i64 = 7;
/// Longest horizon the grid supports, also used by month lookups.
pub const MAX_LIFE_EXPECTANCY: u32 = 100;

/// Key of the persisted profile record.
pub const PROFILE_STORAGE_KEY: &str = "@life_weeks:user_profile";
/// Key of the persisted week-entry collection record.
pub const ENTRIES_STORAGE_KEY: &str = "@life_weeks:week_entries";

const DB_PATH_ENV: &str = "LIFEWEEKS_DB_PATH";
const LOG_LEVEL_ENV: &str = "LIFEWEEKS_LOG_LEVEL";
const LOG_DIR_ENV: &str = "LIFEWEEKS_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "lifeweeks.sqlite3";

/// Validation floors applied where user input enters the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileRules {
    /// Earliest accepted birth year.
    pub min_birth_year: i32,
    /// Lower bound (inclusive) for life expectancy in years.
    pub min_life_expectancy: u32,
    /// Upper bound (inclusive) for life expectancy in years.
    pub max_life_expectancy: u32,
    /// Value offered to new users before they pick one.
    pub default_life_expectancy: u32,
}

impl Default for ProfileRules {
    fn default() -> Self {
        Self {
            min_birth_year: 1900,
            min_life_expectancy: 60,
            max_life_expectancy: MAX_LIFE_EXPECTANCY,
            default_life_expectancy: 80,
        }
    }
}

/// Runtime configuration for hosts embedding the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    pub rules: ProfileRules,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().as_str().to_string(),
            log_dir: None,
            rules: ProfileRules::default(),
        }
    }
}

impl CoreConfig {
    /// Builds a config from `LIFEWEEKS_*` environment variables.
    ///
    /// Blank values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
            rules: defaults.rules,
        }
    }
}
