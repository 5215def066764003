//! Product repository: bulk natural-key upserts and remote-id lookups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use storepulse_core::{ProductId, RemoteId, TenantId, UpsertOutcome};

use super::RepositoryError;
use crate::models::NewProduct;

/// Repository for mirrored product rows.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a batch of products by `(tenant_id, remote_product_id)` in one
    /// round trip, overwriting every mapped field on conflict.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails; the whole
    /// batch is rejected as a unit.
    pub async fn upsert_batch(
        &self,
        tenant_id: TenantId,
        rows: &[NewProduct],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut remote_ids: Vec<RemoteId> = Vec::with_capacity(rows.len());
        let mut titles: Vec<String> = Vec::with_capacity(rows.len());
        let mut vendors: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut product_types: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut prices: Vec<Option<Decimal>> = Vec::with_capacity(rows.len());
        let mut compare_prices: Vec<Option<Decimal>> = Vec::with_capacity(rows.len());
        let mut skus: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut weights: Vec<Option<Decimal>> = Vec::with_capacity(rows.len());
        let mut weight_units: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut inventories: Vec<i32> = Vec::with_capacity(rows.len());
        let mut tags: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut statuses: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut image_urls: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut created: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());
        let mut updated: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());

        for row in rows {
            remote_ids.push(row.remote_product_id);
            titles.push(row.title.clone());
            vendors.push(row.vendor.clone());
            product_types.push(row.product_type.clone());
            prices.push(row.price);
            compare_prices.push(row.compare_at_price);
            skus.push(row.sku.clone());
            weights.push(row.weight);
            weight_units.push(row.weight_unit.clone());
            inventories.push(row.inventory_quantity);
            tags.push(row.tags.clone());
            statuses.push(row.status.clone());
            image_urls.push(row.image_url.clone());
            created.push(row.remote_created_at);
            updated.push(row.remote_updated_at);
        }

        let outcomes = sqlx::query_as::<_, (i64, bool)>(
            r"
            INSERT INTO products (
                tenant_id, remote_product_id, title, vendor, product_type,
                price, compare_at_price, sku, weight, weight_unit,
                inventory_quantity, tags, status, image_url,
                remote_created_at, remote_updated_at
            )
            SELECT $1, u.* FROM UNNEST(
                $2::bigint[], $3::text[], $4::text[], $5::text[],
                $6::numeric[], $7::numeric[], $8::text[], $9::numeric[], $10::text[],
                $11::int4[], $12::text[], $13::text[], $14::text[],
                $15::timestamptz[], $16::timestamptz[]
            ) AS u
            ON CONFLICT (tenant_id, remote_product_id) DO UPDATE SET
                title = EXCLUDED.title,
                vendor = EXCLUDED.vendor,
                product_type = EXCLUDED.product_type,
                price = EXCLUDED.price,
                compare_at_price = EXCLUDED.compare_at_price,
                sku = EXCLUDED.sku,
                weight = EXCLUDED.weight,
                weight_unit = EXCLUDED.weight_unit,
                inventory_quantity = EXCLUDED.inventory_quantity,
                tags = EXCLUDED.tags,
                status = EXCLUDED.status,
                image_url = EXCLUDED.image_url,
                remote_created_at = EXCLUDED.remote_created_at,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = now()
            RETURNING remote_product_id, (xmax = 0) AS inserted
            ",
        )
        .bind(tenant_id)
        .bind(&remote_ids)
        .bind(&titles)
        .bind(&vendors)
        .bind(&product_types)
        .bind(&prices)
        .bind(&compare_prices)
        .bind(&skus)
        .bind(&weights)
        .bind(&weight_units)
        .bind(&inventories)
        .bind(&tags)
        .bind(&statuses)
        .bind(&image_urls)
        .bind(&created)
        .bind(&updated)
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

    /// Map of remote product id to local row id for one tenant, used to
    /// resolve line-item references during the orders phase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<RemoteId, ProductId>, RepositoryError> {
        let rows = sqlx::query_as::<_, (RemoteId, ProductId)>(
            "SELECT remote_product_id, id FROM products WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
