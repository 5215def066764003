//! StorePulse server library.
//!
//! Multi-tenant commerce analytics backend: mirrors each tenant's store
//! data from the remote platform into `PostgreSQL` via periodic incremental
//! sync, and serves the dashboard's auth, sync, and analytics APIs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod sync;
