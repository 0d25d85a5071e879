//! Derived week descriptors.
//!
//! `Week` values are produced by the week calculator on demand and are never
//! persisted.

use crate::model::entry::WeekNumber;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive Monday-to-Sunday date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekSpan {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Position of a week relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStatus {
    Past,
    Current,
    Future,
}

/// One cell of the life grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub week_number: WeekNumber,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: WeekStatus,
    /// True iff a `WeekEntry` exists for `week_number`.
    pub has_entry: bool,
}

impl Week {
    pub fn span(&self) -> WeekSpan {
        WeekSpan {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WeekSpan;
    use chrono::NaiveDate;

    #[test]
    fn span_contains_both_ends() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let span = WeekSpan {
            start: day(4),
            end: day(10),
        };
        assert!(span.contains(day(4)));
        assert!(span.contains(day(10)));
        assert!(!span.contains(day(3)));
        assert!(!span.contains(day(11)));
    }
}
