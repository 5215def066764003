//! Storage abstraction for the reconciliation engine.
//!
//! The engine only ever touches storage through [`SyncStore`]; the
//! production implementation delegates to the repository layer, tests use
//! an in-memory map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storepulse_core::{CustomerId, ProductId, RemoteId, TenantId, UpsertOutcome};

use crate::db::{
    CustomerRepository, OrderRepository, OrderUpsert, ProductRepository, RepositoryError,
    TenantRepository,
};
use crate::models::{NewCustomer, NewOrder, NewOrderItem, NewProduct, Tenant};

/// Everything the engine needs from local storage.
///
/// Batch upserts return one outcome per distinct natural key, in no
/// particular order; callers must not pass the same key twice in one call.
pub trait SyncStore: Send + Sync {
    fn load_tenant(
        &self,
        id: TenantId,
    ) -> impl Future<Output = Result<Option<Tenant>, RepositoryError>> + Send;

    fn active_tenants(
        &self,
    ) -> impl Future<Output = Result<Vec<Tenant>, RepositoryError>> + Send;

    fn upsert_customers(
        &self,
        tenant_id: TenantId,
        rows: &[NewCustomer],
    ) -> impl Future<Output = Result<Vec<UpsertOutcome>, RepositoryError>> + Send;

    fn upsert_products(
        &self,
        tenant_id: TenantId,
        rows: &[NewProduct],
    ) -> impl Future<Output = Result<Vec<UpsertOutcome>, RepositoryError>> + Send;

    fn upsert_orders(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrder],
    ) -> impl Future<Output = Result<Vec<OrderUpsert>, RepositoryError>> + Send;

    fn upsert_order_items(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrderItem],
    ) -> impl Future<Output = Result<Vec<UpsertOutcome>, RepositoryError>> + Send;

    fn customer_ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<HashMap<RemoteId, CustomerId>, RepositoryError>> + Send;

    fn product_ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<HashMap<RemoteId, ProductId>, RepositoryError>> + Send;

    fn mark_synced(
        &self,
        tenant_id: TenantId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// The production store, backed by the repository layer.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SyncStore for PgStore {
    async fn load_tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        TenantRepository::new(&self.pool).get_by_id(id).await
    }

    async fn active_tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        TenantRepository::new(&self.pool).active_tenants().await
    }

    async fn upsert_customers(
        &self,
        tenant_id: TenantId,
        rows: &[NewCustomer],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        CustomerRepository::new(&self.pool)
            .upsert_batch(tenant_id, rows)
            .await
    }

    async fn upsert_products(
        &self,
        tenant_id: TenantId,
        rows: &[NewProduct],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        ProductRepository::new(&self.pool)
            .upsert_batch(tenant_id, rows)
            .await
    }

    async fn upsert_orders(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrder],
    ) -> Result<Vec<OrderUpsert>, RepositoryError> {
        OrderRepository::new(&self.pool)
            .upsert_batch(tenant_id, rows)
            .await
    }

    async fn upsert_order_items(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrderItem],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        OrderRepository::new(&self.pool)
            .upsert_items_batch(tenant_id, rows)
            .await
    }

    async fn customer_ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<RemoteId, CustomerId>, RepositoryError> {
        CustomerRepository::new(&self.pool)
            .ids_by_remote(tenant_id)
            .await
    }

    async fn product_ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<RemoteId, ProductId>, RepositoryError> {
        ProductRepository::new(&self.pool)
            .ids_by_remote(tenant_id)
            .await
    }

    async fn mark_synced(
        &self,
        tenant_id: TenantId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        TenantRepository::new(&self.pool).mark_synced(tenant_id, at).await
    }
}
