//! Dashboard analytics handlers.
//!
//! All queries are scoped to the authenticated tenant. Date ranges default
//! to the last 30 days; revenue aggregates exclude cancelled orders.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::{AnalyticsRepository, DateGrouping};
use crate::error::AppError;
use crate::middleware::AuthTenant;
use crate::state::AppState;

const DEFAULT_RANGE_DAYS: i64 = 30;
const DEFAULT_TOP_LIMIT: i64 = 5;
const MAX_TOP_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

impl DateRangeQuery {
    fn resolve(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = self.end_date.unwrap_or_else(Utc::now);
        let start = self
            .start_date
            .unwrap_or_else(|| end - Duration::days(DEFAULT_RANGE_DAYS));
        (start, end)
    }
}

/// `GET /api/analytics/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    AuthTenant(tenant): AuthTenant,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let (start, end) = range.resolve();
    let stats = AnalyticsRepository::new(state.pool())
        .dashboard_stats(tenant.id, start, end)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": stats,
        "dateRange": {"startDate": start, "endDate": end},
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersByDateQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "group_by")]
    group_by: DateGrouping,
}

/// `GET /api/analytics/orders-by-date?group_by=day|week|month`
pub async fn orders_by_date(
    State(state): State<AppState>,
    AuthTenant(tenant): AuthTenant,
    Query(query): Query<OrdersByDateQuery>,
) -> Result<Json<Value>, AppError> {
    let range = DateRangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let (start, end) = range.resolve();
    let buckets = AnalyticsRepository::new(state.pool())
        .orders_by_date(tenant.id, start, end, query.group_by)
        .await?;

    Ok(Json(json!({"success": true, "data": buckets})))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

impl LimitQuery {
    fn clamp(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT)
    }
}

/// `GET /api/analytics/top-customers?limit=5`
pub async fn top_customers(
    State(state): State<AppState>,
    AuthTenant(tenant): AuthTenant,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>, AppError> {
    let customers = AnalyticsRepository::new(state.pool())
        .top_customers(tenant.id, query.clamp())
        .await?;

    Ok(Json(json!({"success": true, "data": customers})))
}

/// `GET /api/analytics/top-products?limit=5`
pub async fn top_products(
    State(state): State<AppState>,
    AuthTenant(tenant): AuthTenant,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>, AppError> {
    let products = AnalyticsRepository::new(state.pool())
        .top_products(tenant.id, query.clamp())
        .await?;

    Ok(Json(json!({"success": true, "data": products})))
}
