//! Week grid derivation.
//!
//! # Responsibility
//! - Map week numbers to Monday-aligned date spans for a given birth date.
//! - Classify weeks as past/current/future relative to a supplied `today`.
//! - Build the full life grid and its year/month slices.
//! - Validate profile input at the onboarding boundary.
//!
//! # Invariants
//! - Week 1 is the Monday-aligned week containing the birth date.
//! - Week `n + 1` starts exactly one week after week `n`.
//! - The grid holds exactly `years * WEEKS_PER_YEAR` weeks.
//! - Every function is pure; "now" is always a parameter.

use crate::calendar::date_math::{add_weeks, week_end, week_start, weeks_between};
use crate::config::{ProfileRules, MAX_LIFE_EXPECTANCY, WEEKS_PER_YEAR};
use crate::model::entry::WeekNumber;
use crate::model::profile::ProfileValidationError;
use crate::model::week::{Week, WeekSpan, WeekStatus};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Membership test for week numbers that carry a saved entry.
pub trait EntryKeys {
    fn contains_week(&self, week_number: WeekNumber) -> bool;
}

/// Empty key set, for grids rendered before any content exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntries;

impl EntryKeys for NoEntries {
    fn contains_week(&self, _week_number: WeekNumber) -> bool {
        false
    }
}

impl<V> EntryKeys for BTreeMap<WeekNumber, V> {
    fn contains_week(&self, week_number: WeekNumber) -> bool {
        self.contains_key(&week_number)
    }
}

impl<V, S: BuildHasher> EntryKeys for HashMap<WeekNumber, V, S> {
    fn contains_week(&self, week_number: WeekNumber) -> bool {
        self.contains_key(&week_number)
    }
}

impl EntryKeys for BTreeSet<WeekNumber> {
    fn contains_week(&self, week_number: WeekNumber) -> bool {
        self.contains(&week_number)
    }
}

impl<S: BuildHasher> EntryKeys for HashSet<WeekNumber, S> {
    fn contains_week(&self, week_number: WeekNumber) -> bool {
        self.contains(&week_number)
    }
}

impl<T: EntryKeys + ?Sized> EntryKeys for &T {
    fn contains_week(&self, week_number: WeekNumber) -> bool {
        (**self).contains_week(week_number)
    }
}

/// Total grid size for a life expectancy.
pub fn total_weeks(life_expectancy_years: u32) -> u32 {
    life_expectancy_years.saturating_mul(WEEKS_PER_YEAR)
}

/// Returns the Monday-to-Sunday span of `week_number`.
///
/// Anchors once on the birth week's Monday, then steps by whole weeks.
pub fn week_dates(birth_date: NaiveDate, week_number: WeekNumber) -> WeekSpan {
    let anchor = week_start(birth_date);
    let start = add_weeks(anchor, i64::from(week_number) - 1);
    WeekSpan {
        start,
        end: week_end(start),
    }
}

/// Classifies a week span relative to `today`.
pub fn week_status(span: WeekSpan, today: NaiveDate) -> WeekStatus {
    if week_start(today) == span.start {
        WeekStatus::Current
    } else if today > span.end {
        WeekStatus::Past
    } else {
        WeekStatus::Future
    }
}

/// Whole weeks between the birth week and the current week.
pub fn weeks_since_birth(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    weeks_between(week_start(birth_date), week_start(today))
}

/// 1-based number of the week containing `today`.
///
/// Zero or negative when the birth date lies in the future; callers decide
/// whether that is acceptable.
pub fn current_week_number(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    weeks_since_birth(birth_date, today) + 1
}

/// Builds one grid cell.
pub fn generate_week(
    birth_date: NaiveDate,
    week_number: WeekNumber,
    has_entry: bool,
    today: NaiveDate,
) -> Week {
    let span = week_dates(birth_date, week_number);
    Week {
        week_number,
        start_date: span.start,
        end_date: span.end,
        status: week_status(span, today),
        has_entry,
    }
}

/// Looks up a single week, resolving `has_entry` from `entries`.
pub fn week_by_number(
    birth_date: NaiveDate,
    week_number: WeekNumber,
    entries: &impl EntryKeys,
    today: NaiveDate,
) -> Week {
    generate_week(
        birth_date,
        week_number,
        entries.contains_week(week_number),
        today,
    )
}

/// Builds the full life grid, weeks `1..=years * 52` in order.
pub fn all_weeks(
    birth_date: NaiveDate,
    life_expectancy_years: u32,
    entries: &impl EntryKeys,
    today: NaiveDate,
) -> Vec<Week> {
    weeks_in_range(
        birth_date,
        1,
        total_weeks(life_expectancy_years),
        entries,
        today,
    )
}

/// Weeks of one year of life; year 1 holds weeks 1 through 52.
pub fn weeks_in_year(
    birth_date: NaiveDate,
    year_of_life: u32,
    entries: &impl EntryKeys,
    today: NaiveDate,
) -> Vec<Week> {
    if year_of_life == 0 {
        return Vec::new();
    }
    let first = (year_of_life - 1)
        .saturating_mul(WEEKS_PER_YEAR)
        .saturating_add(1);
    let last = year_of_life.saturating_mul(WEEKS_PER_YEAR);
    weeks_in_range(birth_date, first, last, entries, today)
}

/// Weeks whose Monday falls in the given calendar month.
///
/// Searches the maximum supported horizon; an invalid month yields nothing.
pub fn weeks_in_month(
    birth_date: NaiveDate,
    year: i32,
    month: u32,
    entries: &impl EntryKeys,
    today: NaiveDate,
) -> Vec<Week> {
    if !(1..=12).contains(&month) {
        return Vec::new();
    }
    weeks_in_range(
        birth_date,
        1,
        total_weeks(MAX_LIFE_EXPECTANCY),
        entries,
        today,
    )
    .into_iter()
    .filter(|week| week.start_date.year() == year && week.start_date.month() == month)
    .collect()
}

fn weeks_in_range(
    birth_date: NaiveDate,
    first: WeekNumber,
    last: WeekNumber,
    entries: &impl EntryKeys,
    today: NaiveDate,
) -> Vec<Week> {
    (first..=last)
        .map(|week_number| week_by_number(birth_date, week_number, entries, today))
        .collect()
}

/// Completed years of life under the 52-week year model.
pub fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    weeks_since_birth(birth_date, today).div_euclid(i64::from(WEEKS_PER_YEAR))
}

/// Share of the grid already lived, as a percentage in `0.0..=100.0`.
pub fn life_progress(birth_date: NaiveDate, life_expectancy_years: u32, today: NaiveDate) -> f64 {
    let total = total_weeks(life_expectancy_years);
    if total == 0 {
        return 0.0;
    }
    let lived = weeks_since_birth(birth_date, today) as f64;
    (lived / f64::from(total) * 100.0).clamp(0.0, 100.0)
}

/// Formats a week as `"1 Jan - 7 Jan 2024"`.
pub fn format_week(week: &Week) -> String {
    format_week_span(week.span())
}

pub fn format_week_span(span: WeekSpan) -> String {
    format!(
        "{} - {}",
        span.start.format("%-d %b"),
        span.end.format("%-d %b %Y")
    )
}

/// Parses and checks a birth date typed by the user.
///
/// # Errors
/// - `InvalidDateFormat` unless the input is a `YYYY-MM-DD` calendar date.
/// - `BirthDateInFuture` when the date is after `today`.
/// - `BirthYearTooEarly` when the year precedes `rules.min_birth_year`.
pub fn validate_birth_date(
    input: &str,
    today: NaiveDate,
    rules: &ProfileRules,
) -> Result<NaiveDate, ProfileValidationError> {
    let trimmed = input.trim();
    let birth_date = NaiveDate::parse_from_str(trimmed, BIRTH_DATE_FORMAT)
        .map_err(|_| ProfileValidationError::InvalidDateFormat(trimmed.to_string()))?;

    if birth_date > today {
        return Err(ProfileValidationError::BirthDateInFuture { birth_date, today });
    }
    if birth_date.year() < rules.min_birth_year {
        return Err(ProfileValidationError::BirthYearTooEarly {
            year: birth_date.year(),
            min_year: rules.min_birth_year,
        });
    }
    Ok(birth_date)
}

/// Checks a life expectancy against the configured inclusive range.
pub fn validate_life_expectancy(
    years: u32,
    rules: &ProfileRules,
) -> Result<u32, ProfileValidationError> {
    if (rules.min_life_expectancy..=rules.max_life_expectancy).contains(&years) {
        Ok(years)
    } else {
        Err(ProfileValidationError::LifeExpectancyOutOfRange {
            years,
            min: rules.min_life_expectancy,
            max: rules.max_life_expectancy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        age_in_years, all_weeks, current_week_number, format_week_span, life_progress,
        week_dates, week_status, weeks_in_month, weeks_in_year, NoEntries,
    };
    use crate::model::week::WeekStatus;
    use chrono::{Datelike, NaiveDate, Weekday};
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_one_is_the_monday_aligned_birth_week() {
        // 1990-05-17 is a Thursday.
        let span = week_dates(date(1990, 5, 17), 1);
        assert_eq!(span.start, date(1990, 5, 14));
        assert_eq!(span.end, date(1990, 5, 20));
    }

    #[test]
    fn every_week_is_monday_to_sunday_for_any_birth_weekday() {
        for offset in 0..7 {
            let birth = date(1985, 3, 4 + offset);
            for week_number in [1, 2, 53, 1000, 4160] {
                let span = week_dates(birth, week_number);
                assert_eq!(span.start.weekday(), Weekday::Mon);
                assert_eq!((span.end - span.start).num_days(), 6);
            }
        }
    }

    #[test]
    fn status_boundaries_are_inclusive_of_the_current_week() {
        let span = week_dates(date(2024, 1, 1), 2);
        assert_eq!(week_status(span, date(2024, 1, 7)), WeekStatus::Future);
        assert_eq!(week_status(span, date(2024, 1, 8)), WeekStatus::Current);
        assert_eq!(week_status(span, date(2024, 1, 14)), WeekStatus::Current);
        assert_eq!(week_status(span, date(2024, 1, 15)), WeekStatus::Past);
    }

    #[test]
    fn current_week_number_may_be_non_positive_for_future_birth() {
        assert_eq!(current_week_number(date(2024, 1, 17), date(2024, 1, 3)), -1);
        assert_eq!(current_week_number(date(2024, 1, 3), date(2024, 1, 3)), 1);
    }

    #[test]
    fn all_weeks_without_entries_is_contiguous_and_empty() {
        let weeks = all_weeks(date(1990, 1, 1), 60, &NoEntries, date(2024, 6, 1));
        assert_eq!(weeks.len(), 60 * 52);
        assert!(weeks
            .iter()
            .enumerate()
            .all(|(index, week)| week.week_number as usize == index + 1 && !week.has_entry));
    }

    #[test]
    fn weeks_in_year_slices_fifty_two_weeks() {
        let keys = BTreeSet::from([53, 60, 200]);
        let year_two = weeks_in_year(date(1990, 1, 1), 2, &keys, date(2024, 6, 1));
        assert_eq!(year_two.len(), 52);
        assert_eq!(year_two[0].week_number, 53);
        assert_eq!(year_two[51].week_number, 104);
        assert_eq!(year_two.iter().filter(|week| week.has_entry).count(), 2);
        assert!(weeks_in_year(date(1990, 1, 1), 0, &keys, date(2024, 6, 1)).is_empty());
    }

    #[test]
    fn weeks_in_month_matches_start_dates() {
        // Mondays of January 2024: 1, 8, 15, 22, 29.
        let weeks = weeks_in_month(date(1990, 1, 1), 2024, 1, &NoEntries, date(2024, 6, 1));
        let starts: Vec<_> = weeks.iter().map(|week| week.start_date.day()).collect();
        assert_eq!(starts, [1, 8, 15, 22, 29]);
        assert!(weeks_in_month(date(1990, 1, 1), 2024, 13, &NoEntries, date(2024, 6, 1)).is_empty());
    }

    #[test]
    fn age_and_progress_use_the_fifty_two_week_year() {
        let birth = date(2000, 1, 3);
        let today = week_dates(birth, 52 * 20 + 1).start;
        assert_eq!(age_in_years(birth, today), 20);
        assert!((life_progress(birth, 80, today) - 25.0).abs() < f64::EPSILON);
        assert_eq!(life_progress(birth, 80, date(2200, 1, 1)), 100.0);
        assert_eq!(life_progress(birth, 80, date(1999, 1, 1)), 0.0);
    }

    #[test]
    fn format_week_span_uses_short_month_names() {
        let span = week_dates(date(2024, 1, 3), 1);
        assert_eq!(format_week_span(span), "1 Jan - 7 Jan 2024");
    }
}
