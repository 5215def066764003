//! Mirrored product rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use storepulse_core::RemoteId;

/// One product as mapped from a remote payload, ready to upsert by
/// `(tenant_id, remote_product_id)`.
///
/// Price, weight, and SKU come from the first remote variant; inventory is
/// the sum over all variants. A missing price stays `None` (unknown),
/// distinct from a parseable zero (free).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub remote_product_id: RemoteId,
    pub title: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub sku: Option<String>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub inventory_quantity: i32,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}
