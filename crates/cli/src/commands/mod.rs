//! CLI command implementations.

pub mod migrate;
pub mod sync;
pub mod tenant;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use storepulse_server::db::RepositoryError;
use storepulse_server::services::auth::AuthError;
use storepulse_server::sync::SyncError;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("No tenant registered with email {0}")]
    UnknownTenant(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] storepulse_core::EmailError),
}

/// Connect to the database named by `DATABASE_URL`.
///
/// Loads `.env` first so local invocations pick up the same configuration
/// as the server.
pub async fn connect() -> Result<PgPool, CliError> {
    let _ = dotenvy::dotenv();
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| CliError::MissingEnvVar("DATABASE_URL".to_string()))?;

    let pool = storepulse_server::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
