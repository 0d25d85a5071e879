//! Injectable source of "now".
//!
//! Week status and the current week number depend on the current date; the
//! controller reads it through this trait so tests can freeze time.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Current instant, used for `created_at`/`updated_at` stamps.
    fn now(&self) -> DateTime<Utc>;
    /// Current calendar date in the user's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Freezes the clock at midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
