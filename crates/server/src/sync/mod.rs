//! Incremental reconciliation engine.
//!
//! Mirrors one tenant's remote store into local storage in three sequential
//! phases: customers, products, then orders with their line items. Each
//! phase fetches every remote record, maps it to a typed row, and upserts
//! by natural key `(tenant_id, remote_*_id)` so repeated runs converge
//! instead of duplicating.
//!
//! Failure handling is layered:
//!
//! - a record that fails mapping or persistence is counted and skipped;
//! - a transport failure aborts the run, keeping what earlier phases wrote;
//! - `last_sync_at` advances only when all three phases complete.
//!
//! The engine never deletes: rows removed remotely stay until the next
//! remote change overwrites them.

pub mod mapper;
pub mod scheduler;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use storepulse_core::{EntityKind, RemoteId, SyncStats, TenantId};

use crate::db::RepositoryError;
use crate::models::Tenant;
use crate::shopify::StoreApiError;

pub use scheduler::{JobStatus, SyncScheduler};
pub use source::{SourceFactory, StoreSource};
pub use store::{PgStore, SyncStore};

/// Why a sync run could not complete.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No tenant with the requested id.
    #[error("tenant not found")]
    TenantNotFound,

    /// The tenant has not configured both store credentials. The flags name
    /// what is absent.
    #[error("store credentials not configured")]
    MissingCredentials { access_token: bool, store_url: bool },

    /// Another sync for the same tenant is in flight.
    #[error("sync already running for this tenant")]
    AlreadyRunning,

    /// The remote API failed mid-run; work from completed phases remains.
    #[error("store API error: {0}")]
    Transport(#[from] StoreApiError),

    /// Local storage failed outside per-record isolation.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// The reconciliation engine, generic over storage and the remote source so
/// its semantics are testable without either.
///
/// One instance serves every tenant; a per-tenant in-flight guard rejects
/// overlapping runs for the same tenant while leaving other tenants free.
pub struct SyncService<S, F> {
    store: S,
    sources: F,
    batch_size: usize,
    in_flight: Mutex<HashSet<TenantId>>,
}

/// Releases the in-flight slot when the run ends, however it ends.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<TenantId>>,
    tenant_id: TenantId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.tenant_id);
    }
}

impl<S: SyncStore, F: SourceFactory> SyncService<S, F> {
    /// Create an engine writing in chunks of `batch_size` rows.
    ///
    /// `batch_size = 1` gives exact per-record error isolation; larger
    /// sizes trade that for fewer round trips (a failing chunk counts all
    /// its records as errors).
    #[must_use]
    pub fn new(store: S, sources: F, batch_size: usize) -> Self {
        Self {
            store,
            sources,
            batch_size: batch_size.max(1),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying store; the scheduler lists active tenants through it.
    pub(crate) const fn store(&self) -> &S {
        &self.store
    }

    /// Run a full sync for one tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] per the taxonomy: configuration problems fail
    /// before any phase, transport and storage failures abort mid-run.
    #[tracing::instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn sync_tenant(&self, tenant_id: TenantId) -> Result<SyncStats, SyncError> {
        let _guard = self.claim(tenant_id)?;

        let tenant = self
            .store
            .load_tenant(tenant_id)
            .await?
            .ok_or(SyncError::TenantNotFound)?;
        let credentials = match tenant.credentials() {
            Some(c) => c,
            None => return Err(missing_credentials(&tenant)),
        };
        let source = self.sources.connect(&credentials)?;

        info!(store = %credentials.store_name, "starting sync");
        let mut stats = SyncStats::default();

        self.sync_customers(&source, tenant_id, &mut stats).await?;
        self.sync_products(&source, tenant_id, &mut stats).await?;
        self.sync_orders(&source, tenant_id, &mut stats).await?;

        self.store.mark_synced(tenant_id, Utc::now()).await?;
        info!(
            customers = stats.customers.written(),
            products = stats.products.written(),
            orders = stats.orders.written(),
            order_items = stats.order_items.written(),
            errors = stats.total_errors(),
            "sync complete"
        );
        Ok(stats)
    }

    /// Reserve the tenant's in-flight slot for the duration of the run.
    fn claim(&self, tenant_id: TenantId) -> Result<InFlightGuard<'_>, SyncError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(tenant_id) {
            return Err(SyncError::AlreadyRunning);
        }
        drop(in_flight);
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            tenant_id,
        })
    }

    async fn sync_customers(
        &self,
        source: &F::Source,
        tenant_id: TenantId,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let records = source.fetch_customers().await?;
        let kind = EntityKind::Customers;
        let mapped = map_records(&records, kind, stats, mapper::map_customer);

        for chunk in mapped.chunks(self.batch_size) {
            let rows = dedup_last_wins(chunk, |r| r.remote_customer_id);
            match self.store.upsert_customers(tenant_id, &rows).await {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        stats.kind_mut(kind).record(outcome);
                    }
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, lost = chunk.len(), "chunk write failed");
                    stats.kind_mut(kind).record_errors(chunk.len() as u64);
                }
            }
        }
        Ok(())
    }

    async fn sync_products(
        &self,
        source: &F::Source,
        tenant_id: TenantId,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let records = source.fetch_products().await?;
        let kind = EntityKind::Products;
        let mapped = map_records(&records, kind, stats, mapper::map_product);

        for chunk in mapped.chunks(self.batch_size) {
            let rows = dedup_last_wins(chunk, |r| r.remote_product_id);
            match self.store.upsert_products(tenant_id, &rows).await {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        stats.kind_mut(kind).record(outcome);
                    }
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, lost = chunk.len(), "chunk write failed");
                    stats.kind_mut(kind).record_errors(chunk.len() as u64);
                }
            }
        }
        Ok(())
    }

    /// Phase 3: orders, then each written order's line items.
    ///
    /// Reference lookup maps are preloaded once per run; an order created in
    /// this very run can resolve item references because products were
    /// written in phase 2, before the product map is loaded.
    async fn sync_orders(
        &self,
        source: &F::Source,
        tenant_id: TenantId,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let customer_ids = self.store.customer_ids_by_remote(tenant_id).await?;
        let product_ids = self.store.product_ids_by_remote(tenant_id).await?;

        let records = source.fetch_orders().await?;
        let kind = EntityKind::Orders;
        let mapped = map_records(&records, kind, stats, |record| {
            mapper::map_order(record, &customer_ids)
        });

        for chunk in mapped.chunks(self.batch_size) {
            let deduped = dedup_last_wins(chunk, |m| m.row.remote_order_id);
            let rows: Vec<_> = deduped.iter().map(|m| m.row.clone()).collect();

            let upserts = match self.store.upsert_orders(tenant_id, &rows).await {
                Ok(upserts) => upserts,
                Err(e) => {
                    // The orders never got local ids, so their items are
                    // unwritable too; count both kinds.
                    let items_lost: usize = chunk.iter().map(|m| m.line_items.len()).sum();
                    warn!(
                        kind = %kind,
                        error = %e,
                        lost = chunk.len(),
                        items_lost,
                        "chunk write failed"
                    );
                    stats.kind_mut(kind).record_errors(chunk.len() as u64);
                    stats
                        .kind_mut(EntityKind::OrderItems)
                        .record_errors(items_lost as u64);
                    continue;
                }
            };

            let mut order_local_ids: HashMap<RemoteId, _> = HashMap::new();
            for upsert in upserts {
                stats.kind_mut(kind).record(upsert.outcome);
                order_local_ids.insert(upsert.remote_order_id, upsert.id);
            }

            let mut items = Vec::new();
            for order in &deduped {
                let Some(&order_id) = order_local_ids.get(&order.row.remote_order_id) else {
                    continue;
                };
                for record in &order.line_items {
                    match mapper::map_order_item(record, order_id, &product_ids) {
                        Ok(item) => items.push(item),
                        Err(e) => {
                            warn!(kind = %EntityKind::OrderItems, error = %e, "record skipped");
                            stats.kind_mut(EntityKind::OrderItems).record_errors(1);
                        }
                    }
                }
            }

            for item_chunk in items.chunks(self.batch_size) {
                let rows = dedup_last_wins(item_chunk, |i| i.remote_line_item_id);
                match self.store.upsert_order_items(tenant_id, &rows).await {
                    Ok(outcomes) => {
                        for outcome in outcomes {
                            stats.kind_mut(EntityKind::OrderItems).record(outcome);
                        }
                    }
                    Err(e) => {
                        warn!(
                            kind = %EntityKind::OrderItems,
                            error = %e,
                            lost = item_chunk.len(),
                            "chunk write failed"
                        );
                        stats
                            .kind_mut(EntityKind::OrderItems)
                            .record_errors(item_chunk.len() as u64);
                    }
                }
            }
        }
        Ok(())
    }
}

fn missing_credentials(tenant: &Tenant) -> SyncError {
    SyncError::MissingCredentials {
        access_token: tenant
            .store_access_token
            .as_deref()
            .is_none_or(|t| t.trim().is_empty()),
        store_url: tenant.store_url.is_none(),
    }
}

/// Map raw records one at a time, counting failures against `kind`.
fn map_records<T>(
    records: &[serde_json::Value],
    kind: EntityKind,
    stats: &mut SyncStats,
    mut map: impl FnMut(&serde_json::Value) -> Result<T, storepulse_core::raw::RawFieldError>,
) -> Vec<T> {
    let mut mapped = Vec::with_capacity(records.len());
    for record in records {
        match map(record) {
            Ok(row) => mapped.push(row),
            Err(e) => {
                warn!(kind = %kind, error = %e, "record skipped");
                stats.kind_mut(kind).record_errors(1);
            }
        }
    }
    mapped
}

/// Collapse duplicate natural keys within one write chunk, keeping the last
/// occurrence. A multi-row upsert cannot touch the same key twice.
fn dedup_last_wins<T: Clone, K: Eq + Hash>(rows: &[T], mut key: impl FnMut(&T) -> K) -> Vec<T> {
    let mut seen: HashMap<K, usize> = HashMap::with_capacity(rows.len());
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        match seen.entry(key(row)) {
            Entry::Occupied(slot) => {
                if let Some(existing) = out.get_mut(*slot.get()) {
                    *existing = row.clone();
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(out.len());
                out.push(row.clone());
            }
        }
    }
    out
}
