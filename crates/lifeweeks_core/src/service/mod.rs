//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and calendar derivations into actions.
//! - Keep outer layers decoupled from storage details.

pub mod state_controller;
