//! Mirrored customer rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use storepulse_core::RemoteId;

/// One customer as mapped from a remote payload, ready to upsert by
/// `(tenant_id, remote_customer_id)`.
///
/// Spend and order counts are mirrored from the remote system verbatim,
/// never recomputed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub remote_customer_id: RemoteId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub total_spent: Decimal,
    pub orders_count: i32,
    pub state: Option<String>,
    pub tags: Option<String>,
    pub accepts_marketing: bool,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}
