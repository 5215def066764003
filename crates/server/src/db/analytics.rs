//! Read-side aggregate queries over mirrored store data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use storepulse_core::TenantId;

use super::RepositoryError;

/// Bucketing granularity for time-series queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGrouping {
    #[default]
    Day,
    Week,
    Month,
}

impl DateGrouping {
    /// The `date_trunc` field name for this granularity.
    const fn as_trunc_unit(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Headline numbers for the dashboard landing page.
///
/// Revenue figures exclude cancelled orders; order counts do not.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub orders_in_range: i64,
    pub revenue_in_range: Decimal,
    #[sqlx(skip)]
    pub average_order_value: Decimal,
}

/// One time bucket of order counts and revenue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrdersByDateBucket {
    pub date: DateTime<Utc>,
    pub order_count: i64,
    pub revenue: Decimal,
}

/// A customer ranked by lifetime spend.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_spent: Decimal,
    pub orders_count: i32,
}

/// A product ranked by units sold across all line items.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: Uuid,
    pub title: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
}

/// Repository for dashboard aggregate queries.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Compute dashboard totals plus counts and revenue within a date range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dashboard_stats(
        &self,
        tenant_id: TenantId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DashboardStats, RepositoryError> {
        let mut stats = sqlx::query_as::<_, DashboardStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM customers WHERE tenant_id = $1)
                    AS total_customers,
                (SELECT COUNT(*) FROM orders WHERE tenant_id = $1)
                    AS total_orders,
                (SELECT COALESCE(SUM(total_price), 0) FROM orders
                    WHERE tenant_id = $1 AND cancelled_at IS NULL)
                    AS total_revenue,
                (SELECT COUNT(*) FROM orders
                    WHERE tenant_id = $1
                      AND remote_created_at BETWEEN $2 AND $3)
                    AS orders_in_range,
                (SELECT COALESCE(SUM(total_price), 0) FROM orders
                    WHERE tenant_id = $1 AND cancelled_at IS NULL
                      AND remote_created_at BETWEEN $2 AND $3)
                    AS revenue_in_range
            ",
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        stats.average_order_value = if stats.total_orders > 0 {
            stats.total_revenue / Decimal::from(stats.total_orders)
        } else {
            Decimal::ZERO
        };
        Ok(stats)
    }

    /// Order counts and revenue bucketed by `date_trunc` period, oldest
    /// bucket first. Buckets with no orders are absent, not zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn orders_by_date(
        &self,
        tenant_id: TenantId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: DateGrouping,
    ) -> Result<Vec<OrdersByDateBucket>, RepositoryError> {
        // date_trunc's field argument cannot be a bind parameter; the unit
        // string comes from a closed enum, never from the request.
        let sql = format!(
            r"
            SELECT
                date_trunc('{unit}', remote_created_at) AS date,
                COUNT(*) AS order_count,
                COALESCE(SUM(total_price) FILTER (WHERE cancelled_at IS NULL), 0)
                    AS revenue
            FROM orders
            WHERE tenant_id = $1
              AND remote_created_at BETWEEN $2 AND $3
            GROUP BY 1
            ORDER BY 1
            ",
            unit = group_by.as_trunc_unit()
        );

        let buckets = sqlx::query_as::<_, OrdersByDateBucket>(&sql)
            .bind(tenant_id)
            .bind(start)
            .bind(end)
            .fetch_all(self.pool)
            .await?;

        Ok(buckets)
    }

    /// The tenant's highest-spending customers, descending by lifetime
    /// spend as reported by the remote platform.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_customers(
        &self,
        tenant_id: TenantId,
        limit: i64,
    ) -> Result<Vec<TopCustomer>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopCustomer>(
            r"
            SELECT id, email, first_name, last_name, total_spent, orders_count
            FROM customers
            WHERE tenant_id = $1
            ORDER BY total_spent DESC
            LIMIT $2
            ",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Best-selling products by units sold, with the revenue those units
    /// generated. Line items that never resolved to a local product row are
    /// excluded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(
        &self,
        tenant_id: TenantId,
        limit: i64,
    ) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT
                p.id, p.title, p.vendor, p.product_type,
                SUM(oi.quantity)::bigint AS total_quantity,
                COALESCE(SUM(oi.quantity * oi.price), 0) AS total_revenue
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.tenant_id = $1
            GROUP BY p.id, p.title, p.vendor, p.product_type
            ORDER BY total_quantity DESC
            LIMIT $2
            ",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
