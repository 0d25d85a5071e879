#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use lifeweeks_core::{
    BackendError, BackendResult, EntryStore, FixedClock, KeyValueBackend, MemoryKvBackend,
    Profile, StateController,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn profile(birth_date: NaiveDate, years: u32) -> Profile {
    Profile::new(
        birth_date,
        years,
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    )
}

/// Memory backend whose reads and writes can be failed on demand.
#[derive(Debug, Default)]
pub struct FlakyBackend {
    inner: MemoryKvBackend,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> BackendResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueBackend for FlakyBackend {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        self.check(&self.fail_writes, "write")?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(key, value).await
    }

    async fn remove_items(&self, keys: &[&str]) -> BackendResult<()> {
        self.check(&self.fail_writes, "remove")?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_items(keys).await
    }
}

/// Controller over a shared flaky backend with the clock frozen at `today`.
pub fn controller_at(
    backend: &Arc<FlakyBackend>,
    today: NaiveDate,
) -> StateController<Arc<FlakyBackend>> {
    StateController::new(
        EntryStore::new(Arc::clone(backend)),
        Arc::new(FixedClock::at_date(today)),
    )
}

/// Loaded controller that already holds a saved profile.
pub async fn onboarded_controller(
    backend: &Arc<FlakyBackend>,
    birth_date: NaiveDate,
    today: NaiveDate,
) -> StateController<Arc<FlakyBackend>> {
    let mut controller = controller_at(backend, today);
    controller.load().await.unwrap();
    controller
        .save_profile(profile(birth_date, 80))
        .await
        .unwrap();
    controller
}
