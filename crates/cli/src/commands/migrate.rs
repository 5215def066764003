//! Database migration command.
//!
//! The server never runs migrations on startup; this command is the only
//! path that applies them. Migrations live in `crates/server/migrations/`
//! and are embedded into the binary at compile time.

use super::{CliError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CliError::MissingEnvVar` if `DATABASE_URL` is unset,
/// `CliError::Migration` if a migration fails to apply.
pub async fn run() -> Result<(), CliError> {
    tracing::info!("Running database migrations...");

    let pool = connect().await?;
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}
