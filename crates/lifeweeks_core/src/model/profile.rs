//! Profile domain model.
//!
//! # Responsibility
//! - Define the single persisted profile record and its partial update.
//! - Define input-boundary validation errors for profile fields.
//!
//! # Invariants
//! - `birth_date <= today` and the life expectancy range are enforced where
//!   user input is accepted, not when a stored profile is loaded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The user's profile. Created once at onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Calendar date of birth; anchors week number 1.
    pub birth_date: NaiveDate,
    /// Grid horizon in whole years.
    pub life_expectancy_years: u32,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile that has finished onboarding.
    pub fn new(birth_date: NaiveDate, life_expectancy_years: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            birth_date,
            life_expectancy_years,
            onboarding_completed: true,
            created_at,
        }
    }

    /// Returns a copy with every `Some` field of `update` applied.
    pub fn merged(&self, update: &ProfileUpdate) -> Self {
        Self {
            birth_date: update.birth_date.unwrap_or(self.birth_date),
            life_expectancy_years: update
                .life_expectancy_years
                .unwrap_or(self.life_expectancy_years),
            onboarding_completed: update
                .onboarding_completed
                .unwrap_or(self.onboarding_completed),
            created_at: self.created_at,
        }
    }
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub birth_date: Option<NaiveDate>,
    pub life_expectancy_years: Option<u32>,
    pub onboarding_completed: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.birth_date.is_none()
            && self.life_expectancy_years.is_none()
            && self.onboarding_completed.is_none()
    }
}

/// Rejection reasons for profile input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// Input is not a `YYYY-MM-DD` calendar date.
    InvalidDateFormat(String),
    BirthDateInFuture { birth_date: NaiveDate, today: NaiveDate },
    BirthYearTooEarly { year: i32, min_year: i32 },
    LifeExpectancyOutOfRange { years: u32, min: u32, max: u32 },
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateFormat(input) => write!(f, "invalid date format: `{input}`"),
            Self::BirthDateInFuture { birth_date, today } => write!(
                f,
                "birth date {birth_date} cannot be in the future (today is {today})"
            ),
            Self::BirthYearTooEarly { year, min_year } => {
                write!(f, "birth year {year} must not be earlier than {min_year}")
            }
            Self::LifeExpectancyOutOfRange { years, min, max } => write!(
                f,
                "life expectancy {years} must be between {min} and {max} years"
            ),
        }
    }
}

impl Error for ProfileValidationError {}

#[cfg(test)]
mod tests {
    use super::{Profile, ProfileUpdate};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn merged_applies_only_present_fields() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let profile = Profile::new(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(), 80, created_at);

        let update = ProfileUpdate {
            life_expectancy_years: Some(90),
            ..ProfileUpdate::default()
        };
        let merged = profile.merged(&update);

        assert_eq!(merged.birth_date, profile.birth_date);
        assert_eq!(merged.life_expectancy_years, 90);
        assert!(merged.onboarding_completed);
        assert_eq!(merged.created_at, created_at);
        assert!(ProfileUpdate::default().is_empty());
        assert!(!update.is_empty());
    }
}
