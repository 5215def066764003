//! Raw remote payloads to typed local rows.
//!
//! Every function here maps one JSON record to one insertable row, applying
//! the per-field coercion rules: identifiers and order/item prices are
//! required, spend/tax/discount/weight totals default to zero, price and
//! per-item weight fields stay `NULL` when absent, everything else passes
//! through.
//!
//! A mapping failure is always scoped to its record; the engine counts it
//! and moves on.

use std::collections::HashMap;

use serde_json::Value;

use storepulse_core::raw::{self, RawFieldError};
use storepulse_core::{CustomerId, OrderId, ProductId, RemoteId};

use crate::models::{NewCustomer, NewOrder, NewOrderItem, NewProduct};

/// An order row plus the raw line items that belong to it. Items are mapped
/// after the order is written, once its local id exists.
#[derive(Debug, Clone)]
pub struct MappedOrder {
    pub row: NewOrder,
    pub line_items: Vec<Value>,
}

fn required_id(record: &Value) -> Result<RemoteId, RawFieldError> {
    raw::remote_id(record, "id").ok_or(RawFieldError::Missing("id"))
}

/// Map one remote customer record.
///
/// # Errors
///
/// Returns [`RawFieldError`] if the remote id is missing or a timestamp is
/// unparseable.
pub fn map_customer(record: &Value) -> Result<NewCustomer, RawFieldError> {
    Ok(NewCustomer {
        remote_customer_id: required_id(record)?,
        email: raw::string(record, "email"),
        first_name: raw::string(record, "first_name"),
        last_name: raw::string(record, "last_name"),
        phone: raw::string(record, "phone"),
        total_spent: raw::decimal_or_zero(record, "total_spent"),
        orders_count: raw::int_or(record, "orders_count", 0),
        state: raw::string(record, "state"),
        tags: raw::string(record, "tags"),
        accepts_marketing: raw::bool_or(record, "accepts_marketing", false),
        remote_created_at: raw::timestamp(record, "created_at")?,
        remote_updated_at: raw::timestamp(record, "updated_at")?,
    })
}

/// Map one remote product record.
///
/// Price, compare-at price, weight, and SKU come from the first variant;
/// inventory is summed across all variants.
///
/// # Errors
///
/// Returns [`RawFieldError`] if the remote id or title is missing, or a
/// present price/weight/timestamp is unparseable.
pub fn map_product(record: &Value) -> Result<NewProduct, RawFieldError> {
    let variants = raw::items(record, "variants");
    let first_variant = variants.first();

    let price = first_variant
        .map(|v| raw::optional_decimal(v, "price"))
        .transpose()?
        .flatten();
    let compare_at_price = first_variant
        .map(|v| raw::optional_decimal(v, "compare_at_price"))
        .transpose()?
        .flatten();
    let weight = first_variant
        .map(|v| raw::optional_decimal(v, "weight"))
        .transpose()?
        .flatten();
    let inventory_quantity = variants
        .iter()
        .map(|v| raw::int_or(v, "inventory_quantity", 0))
        .sum();

    Ok(NewProduct {
        remote_product_id: required_id(record)?,
        title: raw::string(record, "title").ok_or(RawFieldError::Missing("title"))?,
        vendor: raw::string(record, "vendor"),
        product_type: raw::string(record, "product_type"),
        price,
        compare_at_price,
        sku: first_variant.and_then(|v| raw::string(v, "sku")),
        weight,
        weight_unit: first_variant.and_then(|v| raw::string(v, "weight_unit")),
        inventory_quantity,
        tags: raw::string(record, "tags"),
        status: raw::string(record, "status"),
        image_url: raw::object(record, "image").and_then(|img| raw::string(img, "src")),
        remote_created_at: raw::timestamp(record, "created_at")?,
        remote_updated_at: raw::timestamp(record, "updated_at")?,
    })
}

/// Map one remote order record, resolving its customer reference through
/// the preloaded lookup map. An unresolved reference maps to `None`, not an
/// error; it resolves on a later run once the customer is mirrored.
///
/// # Errors
///
/// Returns [`RawFieldError`] if the remote id or `total_price` is missing,
/// or a present timestamp is unparseable.
pub fn map_order(
    record: &Value,
    customer_ids: &HashMap<RemoteId, CustomerId>,
) -> Result<MappedOrder, RawFieldError> {
    let customer_id = raw::object(record, "customer")
        .and_then(|c| raw::remote_id(c, "id"))
        .and_then(|remote| customer_ids.get(&remote).copied());

    let line_items = raw::items(record, "line_items").to_vec();
    let line_items_count = i32::try_from(line_items.len()).unwrap_or(i32::MAX);

    let row = NewOrder {
        remote_order_id: required_id(record)?,
        customer_id,
        order_number: raw::string(record, "order_number"),
        email: raw::string(record, "email"),
        total_price: raw::required_decimal(record, "total_price")?,
        subtotal_price: raw::decimal_or_zero(record, "subtotal_price"),
        total_tax: raw::decimal_or_zero(record, "total_tax"),
        total_discounts: raw::decimal_or_zero(record, "total_discounts"),
        total_weight: raw::decimal_or_zero(record, "total_weight"),
        currency: raw::string(record, "currency").unwrap_or_else(|| "USD".to_string()),
        financial_status: raw::string(record, "financial_status"),
        fulfillment_status: raw::string(record, "fulfillment_status"),
        processed_at: raw::timestamp(record, "processed_at")?,
        cancelled_at: raw::timestamp(record, "cancelled_at")?,
        line_items_count,
        tags: raw::string(record, "tags"),
        remote_created_at: raw::timestamp(record, "created_at")?,
        remote_updated_at: raw::timestamp(record, "updated_at")?,
    };

    Ok(MappedOrder { row, line_items })
}

/// Map one line item of an already-written order, resolving the product
/// reference like [`map_order`] resolves the customer.
///
/// # Errors
///
/// Returns [`RawFieldError`] if the remote id, title, or price is missing,
/// or a present grams value is unparseable.
pub fn map_order_item(
    record: &Value,
    order_id: OrderId,
    product_ids: &HashMap<RemoteId, ProductId>,
) -> Result<NewOrderItem, RawFieldError> {
    let remote_product_id = raw::remote_id(record, "product_id");
    let product_id = remote_product_id.and_then(|remote| product_ids.get(&remote).copied());

    Ok(NewOrderItem {
        remote_line_item_id: required_id(record)?,
        order_id,
        product_id,
        remote_product_id,
        remote_variant_id: raw::remote_id(record, "variant_id"),
        title: raw::string(record, "title").ok_or(RawFieldError::Missing("title"))?,
        variant_title: raw::string(record, "variant_title"),
        sku: raw::string(record, "sku"),
        quantity: raw::int_or(record, "quantity", 1),
        price: raw::required_decimal(record, "price")?,
        total_discount: raw::decimal_or_zero(record, "total_discount"),
        fulfillment_status: raw::string(record, "fulfillment_status"),
        vendor: raw::string(record, "vendor"),
        weight: raw::optional_decimal(record, "grams")?,
        weight_unit: "g".to_string(),
    })
}
