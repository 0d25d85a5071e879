//! Core domain logic for Life Weeks.
//!
//! Derives a fixed-size grid of life weeks from a birth date and keeps sparse
//! per-week content (journal, todos) in sync with a local key-value store.

pub mod calendar;
pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::clock::{Clock, FixedClock, SystemClock};
pub use calendar::week_calculator::{EntryKeys, NoEntries};
pub use config::{CoreConfig, ProfileRules, WEEKS_PER_YEAR};
pub use kv::{BackendError, BackendResult, KeyValueBackend, MemoryKvBackend, SqliteKvBackend};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogLevel,
    LoggingError,
};
pub use model::entry::{Todo, TodoId, WeekEntry, WeekNumber};
pub use model::profile::{Profile, ProfileUpdate, ProfileValidationError};
pub use model::week::{Week, WeekSpan, WeekStatus};
pub use repo::entry_store::{EntryMap, EntryStore, StorageInfo, StoreError, StoreResult};
pub use service::state_controller::{ControllerError, ControllerResult, StateController};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
