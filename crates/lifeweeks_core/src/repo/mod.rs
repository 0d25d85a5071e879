//! Persistence layer for the profile and week-entry records.
//!
//! # Responsibility
//! - Map domain records to and from the key-value backend.
//! - Report semantic errors (`EntryNotFound`, `ProfileNotFound`) in addition
//!   to backend transport errors.

pub mod entry_store;
