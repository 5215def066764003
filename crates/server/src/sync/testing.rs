//! In-memory engine doubles: a map-backed [`SyncStore`] and a canned
//! [`StoreSource`], for exercising reconciliation semantics without
//! PostgreSQL or a remote store.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;

use storepulse_core::{
    CustomerId, EntityKind, Email, OrderId, ProductId, RemoteId, TenantId, UpsertOutcome,
};

use crate::db::{OrderUpsert, RepositoryError};
use crate::models::{NewCustomer, NewOrder, NewOrderItem, NewProduct, StoreCredentials, Tenant};
use crate::shopify::StoreApiError;
use crate::sync::source::{SourceFactory, StoreSource};
use crate::sync::store::SyncStore;

#[derive(Default)]
struct MemoryInner {
    tenants: HashMap<TenantId, Tenant>,
    customers: HashMap<(TenantId, RemoteId), (CustomerId, NewCustomer)>,
    products: HashMap<(TenantId, RemoteId), (ProductId, NewProduct)>,
    orders: HashMap<(TenantId, RemoteId), (OrderId, NewOrder)>,
    order_items: HashMap<(TenantId, RemoteId), NewOrderItem>,
    last_sync: HashMap<TenantId, DateTime<Utc>>,
    fail_writes: HashSet<EntityKind>,
}

/// Map-backed store with the same upsert-by-natural-key semantics as the
/// real one, plus per-kind write-failure injection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a tenant; `with_credentials` controls whether a store URL
    /// and access token are configured.
    pub fn add_tenant(&self, with_credentials: bool) -> TenantId {
        let id = TenantId::new();
        let n = self.lock().tenants.len();
        let tenant = Tenant {
            id,
            email: Email::parse(&format!("owner{n}@example.com")).unwrap(),
            store_name: format!("store-{n}"),
            store_url: Some(format!("https://store-{n}.myshopify.com")),
            store_access_token: with_credentials.then(|| "shpat_test".to_string()),
            is_active: true,
            last_sync_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().tenants.insert(id, tenant);
        id
    }

    /// Make every write for `kind` fail at the chunk level.
    pub fn fail_writes_for(&self, kind: EntityKind) {
        self.lock().fail_writes.insert(kind);
    }

    pub fn customer(&self, tenant_id: TenantId, remote_id: i64) -> Option<NewCustomer> {
        self.lock()
            .customers
            .get(&(tenant_id, RemoteId::new(remote_id)))
            .map(|(_, row)| row.clone())
    }

    pub fn order(&self, tenant_id: TenantId, remote_id: i64) -> Option<NewOrder> {
        self.lock()
            .orders
            .get(&(tenant_id, RemoteId::new(remote_id)))
            .map(|(_, row)| row.clone())
    }

    pub fn order_item(&self, tenant_id: TenantId, remote_id: i64) -> Option<NewOrderItem> {
        self.lock()
            .order_items
            .get(&(tenant_id, RemoteId::new(remote_id)))
            .cloned()
    }

    /// Row counts for one tenant: (customers, products, orders, items).
    pub fn row_counts(&self, tenant_id: TenantId) -> (usize, usize, usize, usize) {
        let inner = self.lock();
        let count = |keys: Vec<&TenantId>| keys.iter().filter(|t| ***t == tenant_id).count();
        (
            count(inner.customers.keys().map(|(t, _)| t).collect()),
            count(inner.products.keys().map(|(t, _)| t).collect()),
            count(inner.orders.keys().map(|(t, _)| t).collect()),
            count(inner.order_items.keys().map(|(t, _)| t).collect()),
        )
    }

    pub fn last_sync_at(&self, tenant_id: TenantId) -> Option<DateTime<Utc>> {
        self.lock().last_sync.get(&tenant_id).copied()
    }

    fn check_writable(&self, kind: EntityKind) -> Result<(), RepositoryError> {
        if self.lock().fail_writes.contains(&kind) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl SyncStore for MemoryStore {
    async fn load_tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        Ok(self.lock().tenants.get(&id).cloned())
    }

    async fn active_tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let mut tenants: Vec<_> = self
            .lock()
            .tenants
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        tenants.sort_by_key(|t| t.created_at);
        Ok(tenants)
    }

    async fn upsert_customers(
        &self,
        tenant_id: TenantId,
        rows: &[NewCustomer],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        self.check_writable(EntityKind::Customers)?;
        let mut inner = self.lock();
        Ok(rows
            .iter()
            .map(|row| {
                let key = (tenant_id, row.remote_customer_id);
                match inner.customers.get_mut(&key) {
                    Some((_, existing)) => {
                        *existing = row.clone();
                        UpsertOutcome::Updated
                    }
                    None => {
                        inner.customers.insert(key, (CustomerId::new(), row.clone()));
                        UpsertOutcome::Created
                    }
                }
            })
            .collect())
    }

    async fn upsert_products(
        &self,
        tenant_id: TenantId,
        rows: &[NewProduct],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        self.check_writable(EntityKind::Products)?;
        let mut inner = self.lock();
        Ok(rows
            .iter()
            .map(|row| {
                let key = (tenant_id, row.remote_product_id);
                match inner.products.get_mut(&key) {
                    Some((_, existing)) => {
                        *existing = row.clone();
                        UpsertOutcome::Updated
                    }
                    None => {
                        inner.products.insert(key, (ProductId::new(), row.clone()));
                        UpsertOutcome::Created
                    }
                }
            })
            .collect())
    }

    async fn upsert_orders(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrder],
    ) -> Result<Vec<OrderUpsert>, RepositoryError> {
        self.check_writable(EntityKind::Orders)?;
        let mut inner = self.lock();
        Ok(rows
            .iter()
            .map(|row| {
                let key = (tenant_id, row.remote_order_id);
                match inner.orders.get_mut(&key) {
                    Some((id, existing)) => {
                        *existing = row.clone();
                        OrderUpsert {
                            remote_order_id: row.remote_order_id,
                            id: *id,
                            outcome: UpsertOutcome::Updated,
                        }
                    }
                    None => {
                        let id = OrderId::new();
                        inner.orders.insert(key, (id, row.clone()));
                        OrderUpsert {
                            remote_order_id: row.remote_order_id,
                            id,
                            outcome: UpsertOutcome::Created,
                        }
                    }
                }
            })
            .collect())
    }

    async fn upsert_order_items(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrderItem],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        self.check_writable(EntityKind::OrderItems)?;
        let mut inner = self.lock();
        Ok(rows
            .iter()
            .map(|row| {
                let key = (tenant_id, row.remote_line_item_id);
                match inner.order_items.insert(key, row.clone()) {
                    Some(_) => UpsertOutcome::Updated,
                    None => UpsertOutcome::Created,
                }
            })
            .collect())
    }

    async fn customer_ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<RemoteId, CustomerId>, RepositoryError> {
        Ok(self
            .lock()
            .customers
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|((_, remote), (id, _))| (*remote, *id))
            .collect())
    }

    async fn product_ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<RemoteId, ProductId>, RepositoryError> {
        Ok(self
            .lock()
            .products
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|((_, remote), (id, _))| (*remote, *id))
            .collect())
    }

    async fn mark_synced(
        &self,
        tenant_id: TenantId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        if !inner.tenants.contains_key(&tenant_id) {
            return Err(RepositoryError::NotFound);
        }
        inner.last_sync.insert(tenant_id, at);
        if let Some(tenant) = inner.tenants.get_mut(&tenant_id) {
            tenant.last_sync_at = Some(at);
        }
        Ok(())
    }
}

/// Canned remote source with per-kind fetch-failure injection.
#[derive(Clone, Default)]
pub struct FakeSource {
    customers: Vec<Value>,
    products: Vec<Value>,
    orders: Vec<Value>,
    fail_on: Option<EntityKind>,
}

impl FakeSource {
    #[must_use]
    pub fn with_customers(mut self, customers: Vec<Value>) -> Self {
        self.customers = customers;
        self
    }

    #[must_use]
    pub fn with_products(mut self, products: Vec<Value>) -> Self {
        self.products = products;
        self
    }

    #[must_use]
    pub fn with_orders(mut self, orders: Vec<Value>) -> Self {
        self.orders = orders;
        self
    }

    /// Make the fetch for `kind` fail with a transport error.
    #[must_use]
    pub fn failing_on(mut self, kind: EntityKind) -> Self {
        self.fail_on = Some(kind);
        self
    }

    fn fetch(&self, kind: EntityKind, records: &[Value]) -> Result<Vec<Value>, StoreApiError> {
        if self.fail_on == Some(kind) {
            return Err(StoreApiError::Api {
                status: 503,
                message: "injected failure".to_string(),
            });
        }
        Ok(records.to_vec())
    }
}

impl StoreSource for FakeSource {
    async fn fetch_customers(&self) -> Result<Vec<Value>, StoreApiError> {
        self.fetch(EntityKind::Customers, &self.customers)
    }

    async fn fetch_products(&self) -> Result<Vec<Value>, StoreApiError> {
        self.fetch(EntityKind::Products, &self.products)
    }

    async fn fetch_orders(&self) -> Result<Vec<Value>, StoreApiError> {
        self.fetch(EntityKind::Orders, &self.orders)
    }
}

/// Hands every tenant the same [`FakeSource`].
#[derive(Clone)]
pub struct FakeFactory {
    source: FakeSource,
}

impl FakeFactory {
    #[must_use]
    pub const fn new(source: FakeSource) -> Self {
        Self { source }
    }
}

impl SourceFactory for FakeFactory {
    type Source = FakeSource;

    fn connect(&self, _credentials: &StoreCredentials) -> Result<FakeSource, StoreApiError> {
        Ok(self.source.clone())
    }
}
