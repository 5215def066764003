//! Manual sync commands.
//!
//! Builds the same engine the server wires into its scheduler, so a CLI
//! run is indistinguishable from a scheduled one: same phases, same
//! stats, same `last_sync_at` semantics.

use storepulse_core::Email;
use storepulse_server::db::TenantRepository;
use storepulse_server::shopify::ShopifyFactory;
use storepulse_server::sync::{PgStore, SyncService};

use super::{CliError, connect};

const DEFAULT_API_VERSION: &str = "2024-01";
const DEFAULT_BATCH_SIZE: usize = 100;

fn build_service(pool: sqlx::PgPool) -> SyncService<PgStore, ShopifyFactory> {
    let api_version =
        std::env::var("STORE_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
    let batch_size = std::env::var("SYNC_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_BATCH_SIZE);

    SyncService::new(PgStore::new(pool), ShopifyFactory::new(api_version), batch_size)
}

/// Sync a single tenant, looked up by email.
///
/// # Errors
///
/// Returns `CliError::UnknownTenant` if no tenant has this email,
/// `CliError::Sync` if the run fails.
pub async fn sync_one(email: &str) -> Result<(), CliError> {
    let pool = connect().await?;
    let email = Email::parse(email)?;
    let tenant = TenantRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::UnknownTenant(email.as_str().to_string()))?;

    let service = build_service(pool);
    let stats = service.sync_tenant(tenant.id).await?;

    tracing::info!(
        tenant_id = %tenant.id,
        customers = stats.customers.written(),
        products = stats.products.written(),
        orders = stats.orders.written(),
        errors = stats.total_errors(),
        "Sync completed"
    );
    Ok(())
}

/// Sync every active tenant, sequentially.
///
/// A failing tenant is logged and skipped; the run continues with the
/// rest.
///
/// # Errors
///
/// Returns `CliError::Repository` if the tenant listing fails.
pub async fn sync_all() -> Result<(), CliError> {
    let pool = connect().await?;
    let tenants = TenantRepository::new(&pool).active_tenants().await?;
    let service = build_service(pool);

    let mut failures = 0_usize;
    for tenant in &tenants {
        match service.sync_tenant(tenant.id).await {
            Ok(stats) => {
                tracing::info!(
                    tenant_id = %tenant.id,
                    errors = stats.total_errors(),
                    "Tenant synced"
                );
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(tenant_id = %tenant.id, error = %e, "Tenant sync failed");
            }
        }
    }

    tracing::info!(
        tenants = tenants.len(),
        failures,
        "Sync pass complete"
    );
    Ok(())
}
