//! Counters describing the outcome of a sync run.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The entity kinds mirrored from the remote platform, in sync-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customers,
    Products,
    Orders,
    OrderItems,
}

impl EntityKind {
    /// All kinds in sync-phase order.
    pub const ALL: [Self; 4] = [
        Self::Customers,
        Self::Products,
        Self::Orders,
        Self::OrderItems,
    ];

    /// Stable lowercase name, used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::OrderItems => "order_items",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an upsert inserted a new row or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Created/updated/error counters for one entity kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    pub created: u64,
    pub updated: u64,
    pub errors: u64,
}

impl KindStats {
    /// Count one upsert outcome.
    pub const fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    /// Count `n` failed records.
    pub const fn record_errors(&mut self, n: u64) {
        self.errors += n;
    }

    /// Records written (created or updated).
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.created + self.updated
    }
}

/// Per-kind counters for one full sync run.
///
/// Serializes with the camelCase keys the dashboard consumes:
/// `customers`, `products`, `orders`, `orderItems`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub customers: KindStats,
    pub products: KindStats,
    pub orders: KindStats,
    pub order_items: KindStats,
}

impl SyncStats {
    /// Counters for one kind.
    #[must_use]
    pub const fn kind(&self, kind: EntityKind) -> &KindStats {
        match kind {
            EntityKind::Customers => &self.customers,
            EntityKind::Products => &self.products,
            EntityKind::Orders => &self.orders,
            EntityKind::OrderItems => &self.order_items,
        }
    }

    /// Mutable counters for one kind.
    pub const fn kind_mut(&mut self, kind: EntityKind) -> &mut KindStats {
        match kind {
            EntityKind::Customers => &mut self.customers,
            EntityKind::Products => &mut self.products,
            EntityKind::Orders => &mut self.orders,
            EntityKind::OrderItems => &mut self.order_items,
        }
    }

    /// Errors across all kinds.
    #[must_use]
    pub const fn total_errors(&self) -> u64 {
        self.customers.errors + self.products.errors + self.orders.errors + self.order_items.errors
    }
}
