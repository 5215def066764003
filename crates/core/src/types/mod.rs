//! Core types for StorePulse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod raw;
pub mod stats;

pub use email::{Email, EmailError};
pub use id::*;
pub use raw::RawFieldError;
pub use stats::{EntityKind, KindStats, SyncStats, UpsertOutcome};
