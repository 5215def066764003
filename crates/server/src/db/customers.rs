//! Customer repository: bulk natural-key upserts and remote-id lookups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use storepulse_core::{CustomerId, RemoteId, TenantId, UpsertOutcome};

use super::RepositoryError;
use crate::models::NewCustomer;

/// Repository for mirrored customer rows.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a batch of customers by `(tenant_id, remote_customer_id)` in
    /// one round trip.
    ///
    /// Every mapped field is overwritten on conflict. The returned outcomes
    /// distinguish inserts from updates via the `xmax = 0` system-column
    /// check (a freshly inserted row has no update transaction id).
    ///
    /// Callers must not pass the same natural key twice in one batch; a
    /// multi-row upsert cannot touch one key twice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails; the whole
    /// batch is rejected as a unit.
    pub async fn upsert_batch(
        &self,
        tenant_id: TenantId,
        rows: &[NewCustomer],
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut remote_ids: Vec<RemoteId> = Vec::with_capacity(rows.len());
        let mut emails: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut first_names: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut last_names: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut phones: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut totals_spent: Vec<Decimal> = Vec::with_capacity(rows.len());
        let mut orders_counts: Vec<i32> = Vec::with_capacity(rows.len());
        let mut states: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut tags: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut accepts: Vec<bool> = Vec::with_capacity(rows.len());
        let mut created: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());
        let mut updated: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(rows.len());

        for row in rows {
            remote_ids.push(row.remote_customer_id);
            emails.push(row.email.clone());
            first_names.push(row.first_name.clone());
            last_names.push(row.last_name.clone());
            phones.push(row.phone.clone());
            totals_spent.push(row.total_spent);
            orders_counts.push(row.orders_count);
            states.push(row.state.clone());
            tags.push(row.tags.clone());
            accepts.push(row.accepts_marketing);
            created.push(row.remote_created_at);
            updated.push(row.remote_updated_at);
        }

        let outcomes = sqlx::query_as::<_, (i64, bool)>(
            r"
            INSERT INTO customers (
                tenant_id, remote_customer_id, email, first_name, last_name, phone,
                total_spent, orders_count, state, tags, accepts_marketing,
                remote_created_at, remote_updated_at
            )
            SELECT $1, u.* FROM UNNEST(
                $2::bigint[], $3::text[], $4::text[], $5::text[], $6::text[],
                $7::numeric[], $8::int4[], $9::text[], $10::text[], $11::bool[],
                $12::timestamptz[], $13::timestamptz[]
            ) AS u
            ON CONFLICT (tenant_id, remote_customer_id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                total_spent = EXCLUDED.total_spent,
                orders_count = EXCLUDED.orders_count,
                state = EXCLUDED.state,
                tags = EXCLUDED.tags,
                accepts_marketing = EXCLUDED.accepts_marketing,
                remote_created_at = EXCLUDED.remote_created_at,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = now()
            RETURNING remote_customer_id, (xmax = 0) AS inserted
            ",
        )
        .bind(tenant_id)
        .bind(&remote_ids)
        .bind(&emails)
        .bind(&first_names)
        .bind(&last_names)
        .bind(&phones)
        .bind(&totals_spent)
        .bind(&orders_counts)
        .bind(&states)
        .bind(&tags)
        .bind(&accepts)
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

    /// Map of remote customer id to local row id for one tenant, used to
    /// resolve order references during the orders phase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ids_by_remote(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<RemoteId, CustomerId>, RepositoryError> {
        let rows = sqlx::query_as::<_, (RemoteId, CustomerId)>(
            "SELECT remote_customer_id, id FROM customers WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
