//! Monday-aligned week primitives.
//!
//! # Invariants
//! - `week_start` always returns a Monday; `week_end` the following Sunday.
//! - All functions are total: out-of-range shifts saturate at the
//!   representable date bounds instead of panicking.

use crate::config::DAYS_PER_WEEK;
use chrono::{Datelike, NaiveDate, TimeDelta};

/// Returns the Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    shift_days(date, -offset)
}

/// Returns the Sunday of the week containing `date` (six days after `week_start`).
pub fn week_end(date: NaiveDate) -> NaiveDate {
    shift_days(week_start(date), DAYS_PER_WEEK - 1)
}

/// Counts whole weeks from `from` to `to`, rounding toward negative infinity.
///
/// Negative when `to` precedes `from`.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from)
        .num_days()
        .div_euclid(DAYS_PER_WEEK)
}

/// Shifts `date` by exactly `weeks * 7` days.
pub fn add_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    shift_days(date, weeks.saturating_mul(DAYS_PER_WEEK))
}

/// Returns whether both dates fall in the same Monday-to-Sunday week.
pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

#[cfg(test)]
mod tests {
    use super::{add_weeks, same_week, week_end, week_start, weeks_between};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_is_monday_for_every_weekday() {
        // 2024-01-01 is a Monday.
        for offset in 0..7 {
            let day = date(2024, 1, 1 + offset);
            assert_eq!(week_start(day), date(2024, 1, 1), "day {day}");
        }
        assert_eq!(week_start(date(2024, 1, 8)), date(2024, 1, 8));
    }

    #[test]
    fn week_end_is_sunday_six_days_later() {
        let end = week_end(date(2024, 2, 28));
        assert_eq!(end.weekday(), Weekday::Sun);
        assert_eq!(end, date(2024, 3, 3));
        assert_eq!((end - week_start(date(2024, 2, 28))).num_days(), 6);
    }

    #[test]
    fn weeks_between_uses_floor_semantics() {
        let monday = date(2024, 1, 1);
        assert_eq!(weeks_between(monday, date(2024, 1, 7)), 0);
        assert_eq!(weeks_between(monday, date(2024, 1, 8)), 1);
        assert_eq!(weeks_between(monday, date(2023, 12, 31)), -1);
        assert_eq!(weeks_between(monday, date(2023, 12, 25)), -1);
        assert_eq!(weeks_between(monday, date(2023, 12, 24)), -2);
    }

    #[test]
    fn add_weeks_shifts_whole_weeks_in_both_directions() {
        let monday = date(2024, 1, 1);
        assert_eq!(add_weeks(monday, 1), date(2024, 1, 8));
        assert_eq!(add_weeks(monday, -1), date(2023, 12, 25));
        assert_eq!(add_weeks(monday, 52), date(2024, 12, 30));
    }

    #[test]
    fn add_weeks_saturates_instead_of_panicking() {
        assert_eq!(add_weeks(date(2024, 1, 1), i64::MAX), NaiveDate::MAX);
        assert_eq!(add_weeks(date(2024, 1, 1), i64::MIN), NaiveDate::MIN);
    }

    #[test]
    fn same_week_crosses_month_and_year_boundaries() {
        assert!(same_week(date(2024, 12, 30), date(2025, 1, 5)));
        assert!(!same_week(date(2025, 1, 5), date(2025, 1, 6)));
    }
}
