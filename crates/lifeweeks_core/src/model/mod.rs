//! Domain model for the life grid.
//!
//! # Responsibility
//! - Define the persisted records (`Profile`, `WeekEntry`, `Todo`).
//! - Define the derived, never-persisted `Week` descriptor.
//!
//! # Invariants
//! - At most one `WeekEntry` exists per week number.
//! - `WeekEntry` spans are exactly Monday to Sunday.

pub mod entry;
pub mod profile;
pub mod week;
