//! Mirrored order and line-item rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use storepulse_core::{CustomerId, OrderId, ProductId, RemoteId};

/// One order as mapped from a remote payload, ready to upsert by
/// `(tenant_id, remote_order_id)`.
///
/// `customer_id` is resolved against already-synced customers at mapping
/// time; `None` means the remote customer was absent or not yet mirrored,
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub remote_order_id: RemoteId,
    pub customer_id: Option<CustomerId>,
    pub order_number: Option<String>,
    pub email: Option<String>,
    pub total_price: Decimal,
    pub subtotal_price: Decimal,
    pub total_tax: Decimal,
    pub total_discounts: Decimal,
    pub total_weight: Decimal,
    pub currency: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub line_items_count: i32,
    pub tags: Option<String>,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

/// One order line item, keyed by `(tenant_id, remote_line_item_id)`.
///
/// The order reference is set to the just-upserted parent order's local id;
/// the product reference resolves like `NewOrder::customer_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub remote_line_item_id: RemoteId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub remote_product_id: Option<RemoteId>,
    pub remote_variant_id: Option<RemoteId>,
    pub title: String,
    pub variant_title: Option<String>,
    pub sku: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub total_discount: Decimal,
    pub fulfillment_status: Option<String>,
    pub vendor: Option<String>,
    /// Weight in grams; `None` when the remote payload carries no weight.
    pub weight: Option<Decimal>,
    pub weight_unit: String,
}
