//! Tenant management commands.

use storepulse_server::db::TenantRepository;
use storepulse_server::services::auth::AuthService;

use super::{CliError, connect};

/// Create a new tenant account.
///
/// Goes through the same registration path as `POST /api/auth/register`,
/// so email validation, password strength, and uniqueness checks all
/// apply.
///
/// # Errors
///
/// Returns `CliError::Auth` for invalid input or a duplicate account.
pub async fn create(
    email: &str,
    password: &str,
    store_name: &str,
    access_token: Option<&str>,
) -> Result<(), CliError> {
    let pool = connect().await?;
    let tenant = AuthService::new(&pool)
        .register(email, password, store_name, access_token)
        .await?;

    tracing::info!(
        tenant_id = %tenant.id,
        email = %tenant.email,
        store_name = %tenant.store_name,
        has_access_token = tenant.store_access_token.is_some(),
        "Tenant created"
    );
    Ok(())
}

/// List active tenants in registration order.
///
/// # Errors
///
/// Returns `CliError::Repository` if the query fails.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let tenants = TenantRepository::new(&pool).active_tenants().await?;

    if tenants.is_empty() {
        println!("No active tenants");
        return Ok(());
    }

    println!(
        "{:<38} {:<30} {:<20} {:<7} LAST SYNC",
        "ID", "EMAIL", "STORE", "TOKEN"
    );
    for tenant in tenants {
        let last_sync = tenant
            .last_sync_at
            .map_or_else(|| "never".to_string(), |at| at.to_rfc3339());
        println!(
            "{:<38} {:<30} {:<20} {:<7} {last_sync}",
            tenant.id.to_string(),
            tenant.email.as_str(),
            tenant.store_name,
            if tenant.store_access_token.is_some() {
                "yes"
            } else {
                "no"
            },
        );
    }
    Ok(())
}
