//! Order and line-item repository: bulk natural-key upserts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use storepulse_core::{CustomerId, OrderId, ProductId, RemoteId, TenantId, UpsertOutcome};

use super::RepositoryError;
use crate::models::{NewOrder, NewOrderItem};

/// Result of upserting one order: the local row id the order's line items
/// must reference, plus whether the row was inserted or rewritten.
#[derive(Debug, Clone, Copy)]
pub struct OrderUpsert {
    pub remote_order_id: RemoteId,
    pub id: OrderId,
    pub outcome: UpsertOutcome,
}

/// Repository for mirrored order and order-item rows.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a batch of orders by `(tenant_id, remote_order_id)` in one
    /// round trip, overwriting every mapped field on conflict.
    ///
    /// Returns one [`OrderUpsert`] per row so callers can attach line items
    /// to the local order ids.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails; the whole
    /// batch is rejected as a unit.
    pub async fn upsert_batch(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrder],
    ) -> Result<Vec<OrderUpsert>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut remote_ids: Vec<RemoteId> = Vec::with_capacity(rows.len());
        let mut customer_ids: Vec<Option<CustomerId>> = Vec::with_capacity(rows.len());
        let mut order_numbers: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut emails: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut total_prices: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut subtotals: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut taxes: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut discounts: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut total_weights: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut currencies: Vec<String> = Vec::with_capacity(rows.len());
        let mut financial: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut fulfillment: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut processed: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());
        let mut cancelled: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());
        let mut item_counts: Vec<i32> = Vec::with_capacity(rows.len());
        let mut tags: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut created: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());
        let mut updated: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());

        for row in rows {
            remote_ids.push(row.remote_order_id);
            customer_ids.push(row.customer_id);
            order_numbers.push(row.order_number.clone());
            emails.push(row.email.clone());
            total_prices.push(row.total_price);
            subtotals.push(row.subtotal_price);
            taxes.push(row.total_tax);
            discounts.push(row.total_discounts);
            total_weights.push(row.total_weight);
            currencies.push(row.currency.clone());
            financial.push(row.financial_status.clone());
            fulfillment.push(row.fulfillment_status.clone());
            processed.push(row.processed_at);
            cancelled.push(row.cancelled_at);
            item_counts.push(row.line_items_count);
            tags.push(row.tags.clone());
            created.push(row.remote_created_at);
            updated.push(row.remote_updated_at);
        }

        let results = sqlx::query_as::<_, (RemoteId, OrderId, bool)>(
            r"
            INSERT INTO orders (
                tenant_id, remote_order_id, customer_id, order_number, email,
                total_price, subtotal_price, total_tax, total_discounts,
                total_weight, currency,
                financial_status, fulfillment_status, processed_at, cancelled_at,
                line_items_count, tags, remote_created_at, remote_updated_at
            )
            SELECT $1, u.* FROM UNNEST(
                $2::bigint[], $3::uuid[], $4::text[], $5::text[],
                $6::numeric[], $7::numeric[], $8::numeric[], $9::numeric[],
                $10::numeric[], $11::text[],
                $12::text[], $13::text[], $14::timestamptz[], $15::timestamptz[],
                $16::int4[], $17::text[], $18::timestamptz[], $19::timestamptz[]
            ) AS u
            ON CONFLICT (tenant_id, remote_order_id) DO UPDATE SET
                customer_id = EXCLUDED.customer_id,
                order_number = EXCLUDED.order_number,
                email = EXCLUDED.email,
                total_price = EXCLUDED.total_price,
                subtotal_price = EXCLUDED.subtotal_price,
                total_tax = EXCLUDED.total_tax,
                total_discounts = EXCLUDED.total_discounts,
                total_weight = EXCLUDED.total_weight,
                currency = EXCLUDED.currency,
                financial_status = EXCLUDED.financial_status,
                fulfillment_status = EXCLUDED.fulfillment_status,
                processed_at = EXCLUDED.processed_at,
                cancelled_at = EXCLUDED.cancelled_at,
                line_items_count = EXCLUDED.line_items_count,
                tags = EXCLUDED.tags,
                remote_created_at = EXCLUDED.remote_created_at,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = now()
            RETURNING remote_order_id, id, (xmax = 0) AS inserted
            ",
        )
        .bind(tenant_id)
        .bind(&remote_ids)
        .bind(&customer_ids)
        .bind(&order_numbers)
        .bind(&emails)
        .bind(&total_prices)
        .bind(&subtotals)
        .bind(&taxes)
        .bind(&discounts)
        .bind(&total_weights)
        .bind(&currencies)
        .bind(&financial)
        .bind(&fulfillment)
        .bind(&processed)
        .bind(&cancelled)
        .bind(&item_counts)
        .bind(&tags)
        .bind(&created)
        .bind(&updated)
        .fetch_all(self.pool)
        .await?;

        Ok(results
            .into_iter()
            .map(|(remote_order_id, id, inserted)| OrderUpsert {
                remote_order_id,
                id,
                outcome: if inserted {
                    UpsertOutcome::Created
                } else {
                    UpsertOutcome::Updated
                },
            })
            .collect())
    }

    /// Upsert a batch of line items by `(tenant_id, remote_line_item_id)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails; the whole
    /// batch is rejected as a unit.
    pub async fn upsert_items_batch(
        &self,
        tenant_id: TenantId,
        rows: &[NewOrderItem],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut remote_ids: Vec<RemoteId> = Vec::with_capacity(rows.len());
        let mut order_ids: Vec<OrderId> = Vec::with_capacity(rows.len());
        let mut product_ids: Vec<Option<ProductId>> = Vec::with_capacity(rows.len());
        let mut remote_product_ids: Vec<Option<RemoteId>> = Vec::with_capacity(rows.len());
        let mut remote_variant_ids: Vec<Option<RemoteId>> = Vec::with_capacity(rows.len());
        let mut titles: Vec<String> = Vec::with_capacity(rows.len());
        let mut variant_titles: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut skus: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut quantities: Vec<i32> = Vec::with_capacity(rows.len());
        let mut prices: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut item_discounts: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut fulfillment: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut vendors: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut weights: Vec<Option<Decimal>> = Vec::with_capacity(rows.len());
        let mut weight_units: Vec<String> = Vec::with_capacity(rows.len());

        for row in rows {
            remote_ids.push(row.remote_line_item_id);
            order_ids.push(row.order_id);
            product_ids.push(row.product_id);
            remote_product_ids.push(row.remote_product_id);
            remote_variant_ids.push(row.remote_variant_id);
            titles.push(row.title.clone());
            variant_titles.push(row.variant_title.clone());
            skus.push(row.sku.clone());
            quantities.push(row.quantity);
            prices.push(row.price);
            item_discounts.push(row.total_discount);
            fulfillment.push(row.fulfillment_status.clone());
            vendors.push(row.vendor.clone());
            weights.push(row.weight);
            weight_units.push(row.weight_unit.clone());
        }

        let outcomes = sqlx::query_as::<_, (i64, bool)>(
            r"
            INSERT INTO order_items (
                tenant_id, remote_line_item_id, order_id, product_id,
                remote_product_id, remote_variant_id, title, variant_title, sku,
                quantity, price, total_discount, fulfillment_status, vendor,
                weight, weight_unit
            )
            SELECT $1, u.* FROM UNNEST(
                $2::bigint[], $3::uuid[], $4::uuid[],
                $5::bigint[], $6::bigint[], $7::text[], $8::text[], $9::text[],
                $10::int4[], $11::numeric[], $12::numeric[], $13::text[], $14::text[],
                $15::numeric[], $16::text[]
            ) AS u
            ON CONFLICT (tenant_id, remote_line_item_id) DO UPDATE SET
                order_id = EXCLUDED.order_id,
                product_id = EXCLUDED.product_id,
                remote_product_id = EXCLUDED.remote_product_id,
                remote_variant_id = EXCLUDED.remote_variant_id,
                title = EXCLUDED.title,
                variant_title = EXCLUDED.variant_title,
                sku = EXCLUDED.sku,
                quantity = EXCLUDED.quantity,
                price = EXCLUDED.price,
                total_discount = EXCLUDED.total_discount,
                fulfillment_status = EXCLUDED.fulfillment_status,
                vendor = EXCLUDED.vendor,
                weight = EXCLUDED.weight,
                weight_unit = EXCLUDED.weight_unit,
                updated_at = now()
            RETURNING remote_line_item_id, (xmax = 0) AS inserted
            ",
        )
        .bind(tenant_id)
        .bind(&remote_ids)
        .bind(&order_ids)
        .bind(&product_ids)
        .bind(&remote_product_ids)
        .bind(&remote_variant_ids)
        .bind(&titles)
        .bind(&variant_titles)
        .bind(&skus)
        .bind(&quantities)
        .bind(&prices)
        .bind(&item_discounts)
        .bind(&fulfillment)
        .bind(&vendors)
        .bind(&weights)
        .bind(&weight_units)
        .fetch_all(self.pool)
        .await?;

        Ok(outcomes
            .into_iter()
            .map(|(_, inserted)| {
                if inserted {
                    UpsertOutcome::Created
                } else {
                    UpsertOutcome::Updated
                }
            })
            .collect())
    }
}
