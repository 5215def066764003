//! Database operations for the StorePulse `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `tenants` - Merchant accounts and their store credentials
//! - `customers` / `products` / `orders` / `order_items` - Mirrored store
//!   data, every row scoped by `tenant_id`
//!
//! All queries take the tenant id explicitly; cross-tenant isolation is
//! enforced by scoping, never by locking.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p storepulse-cli -- migrate
//! ```

pub mod analytics;
pub mod customers;
pub mod orders;
pub mod products;
pub mod tenants;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use analytics::{AnalyticsRepository, DateGrouping};
pub use customers::CustomerRepository;
pub use orders::{OrderRepository, OrderUpsert};
pub use products::ProductRepository;
pub use tenants::TenantRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or store name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
