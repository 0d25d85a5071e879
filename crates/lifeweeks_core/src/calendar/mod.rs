//! Calendar arithmetic for the life grid.
//!
//! # Responsibility
//! - Provide Monday-aligned week primitives (`date_math`).
//! - Derive week boundaries, statuses and the full grid (`week_calculator`).
//! - Abstract "now" behind an injectable clock (`clock`).
//!
//! # Invariants
//! - Every derived week boundary goes through `week_start`/`add_weeks`.
//! - Functions here never touch persistence.

pub mod clock;
pub mod date_math;
pub mod week_calculator;
