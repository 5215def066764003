//! StorePulse Core - Shared types library.
//!
//! This crate provides common types used across all StorePulse components:
//! - `server` - Multi-tenant analytics API and sync engine
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, sync run
//!   statistics, and tolerant readers for loosely-typed remote payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
