//! Tenant account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storepulse_core::{Email, TenantId};

/// A merchant account. The unit of data isolation: every mirrored row is
/// scoped to exactly one tenant.
#[derive(Clone)]
pub struct Tenant {
    pub id: TenantId,
    pub email: Email,
    pub store_name: String,
    /// Derived from the store name at registration (`https://{store}.myshopify.com`).
    pub store_url: Option<String>,
    /// Remote Admin API access token. Required before any sync can run.
    pub store_access_token: Option<String>,
    pub is_active: bool,
    /// Set only when a sync run completes all three phases.
    pub last_sync_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Tenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tenant")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("store_name", &self.store_name)
            .field("store_url", &self.store_url)
            .field(
                "store_access_token",
                &self.store_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("is_active", &self.is_active)
            .field("last_sync_at", &self.last_sync_at)
            .finish_non_exhaustive()
    }
}

/// The credential pair a sync run needs; present only when both halves are
/// configured.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub store_name: String,
    pub access_token: String,
}

impl Tenant {
    /// The store credentials, if fully configured.
    #[must_use]
    pub fn credentials(&self) -> Option<StoreCredentials> {
        let access_token = self
            .store_access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())?;
        self.store_url.as_deref()?;
        Some(StoreCredentials {
            store_name: self.store_name.clone(),
            access_token: access_token.to_string(),
        })
    }

    /// The public view of this tenant, safe to return to API clients.
    #[must_use]
    pub fn profile(&self) -> TenantProfile {
        TenantProfile {
            id: self.id,
            email: self.email.as_str().to_string(),
            store_name: self.store_name.clone(),
            store_url: self.store_url.clone(),
            has_access_token: self.store_access_token.is_some(),
            is_active: self.is_active,
            last_sync_at: self.last_sync_at,
            created_at: self.created_at,
        }
    }
}

/// Tenant fields exposed over the API. Never carries the password hash or
/// the store access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantProfile {
    pub id: TenantId,
    pub email: String,
    pub store_name: String,
    pub store_url: Option<String>,
    pub has_access_token: bool,
    pub is_active: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
