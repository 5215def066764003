//! Tenant repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storepulse_core::{Email, TenantId};

use super::RepositoryError;
use crate::models::Tenant;

/// Raw tenant row as stored; converted to [`Tenant`] after validating the
/// email column.
#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    email: String,
    store_name: String,
    store_url: Option<String>,
    store_access_token: Option<String>,
    is_active: bool,
    last_sync_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = RepositoryError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: TenantId::from_uuid(row.id),
            email,
            store_name: row.store_name,
            store_url: row.store_url,
            store_access_token: row.store_access_token,
            is_active: row.is_active,
            last_sync_at: row.last_sync_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const TENANT_COLUMNS: &str = "id, email, store_name, store_url, store_access_token, \
     is_active, last_sync_at, created_at, updated_at";

/// Repository for tenant database operations.
pub struct TenantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TenantRepository<'a> {
    /// Create a new tenant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new tenant account.
    ///
    /// The store URL is derived from the store name
    /// (`https://{store}.myshopify.com`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or store name is
    /// already registered, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        store_name: &str,
        store_access_token: Option<&str>,
    ) -> Result<Tenant, RepositoryError> {
        let store_url = format!("https://{store_name}.myshopify.com");
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "INSERT INTO tenants (email, password_hash, store_name, store_url, store_access_token)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(password_hash)
        .bind(store_name)
        .bind(&store_url)
        .bind(store_access_token)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "email or store name already registered".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Get a tenant by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Tenant::try_from).transpose()
    }

    /// Get a tenant by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Tenant::try_from).transpose()
    }

    /// Get a tenant together with their password hash, for login.
    ///
    /// Returns `None` if no tenant exists with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Tenant, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct WithPassword {
            password_hash: String,
            #[sqlx(flatten)]
            tenant: TenantRow,
        }

        let row = sqlx::query_as::<_, WithPassword>(&format!(
            "SELECT password_hash, {TENANT_COLUMNS} FROM tenants WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.tenant.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Update a tenant's store profile. A new store name re-derives the
    /// store URL; `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tenant does not exist,
    /// `RepositoryError::Conflict` if the new store name is taken.
    pub async fn update_profile(
        &self,
        id: TenantId,
        store_name: Option<&str>,
        store_access_token: Option<&str>,
    ) -> Result<Tenant, RepositoryError> {
        let store_url = store_name.map(|name| format!("https://{name}.myshopify.com"));
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "UPDATE tenants SET
                 store_name = COALESCE($2, store_name),
                 store_url = COALESCE($3, store_url),
                 store_access_token = COALESCE($4, store_access_token),
                 updated_at = now()
             WHERE id = $1
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .bind(store_name)
        .bind(store_url)
        .bind(store_access_token)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("store name already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// All tenants with the active flag set, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let rows = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE is_active ORDER BY created_at"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Tenant::try_from).collect()
    }

    /// Record a fully completed sync run.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tenant does not exist.
    pub async fn mark_synced(
        &self,
        id: TenantId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE tenants SET last_sync_at = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
