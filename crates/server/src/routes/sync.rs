//! Sync trigger and status handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::middleware::AuthTenant;
use crate::state::AppState;

/// `POST /api/sync`
///
/// Runs a full sync for the authenticated tenant, inline. Returns the full
/// per-kind stats on success; failures map per the error taxonomy (404
/// unknown tenant, 400 missing credentials, 409 already running, 502
/// transport, 500 storage).
pub async fn trigger(
    State(state): State<AppState>,
    AuthTenant(tenant): AuthTenant,
) -> Result<Json<Value>, AppError> {
    let stats = state.sync().sync_tenant(tenant.id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Sync completed",
        "stats": stats,
    })))
}

/// `GET /api/sync/status`
pub async fn status(AuthTenant(tenant): AuthTenant) -> Json<Value> {
    Json(json!({
        "success": true,
        "tenantId": tenant.id,
        "lastSyncAt": tenant.last_sync_at,
        "storeUrl": tenant.store_url,
        "hasSynced": tenant.last_sync_at.is_some(),
    }))
}

/// `GET /api/sync/jobs`
pub async fn jobs(State(state): State<AppState>, _auth: AuthTenant) -> Json<Value> {
    Json(json!({
        "success": true,
        "jobs": state.scheduler().status(),
    }))
}
