//! Tenant registration, login, and profile handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::db::TenantRepository;
use crate::error::AppError;
use crate::middleware::AuthTenant;
use crate::models::TenantProfile;
use crate::services::auth::{AuthService, issue_token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub store_name: String,
    pub store_access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    success: bool,
    token: String,
    tenant: TenantProfile,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let store_name = req.store_name.trim();
    if store_name.is_empty() {
        return Err(AppError::BadRequest("store name is required".to_string()));
    }

    let tenant = AuthService::new(state.pool())
        .register(
            &req.email,
            &req.password,
            store_name,
            req.store_access_token.as_deref(),
        )
        .await?;
    let token = issue_token(
        tenant.id,
        &state.config().jwt_secret,
        state.config().jwt_expiry_hours,
    )?;

    tracing::info!(tenant_id = %tenant.id, store = %tenant.store_name, "tenant registered");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            token,
            tenant: tenant.profile(),
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let tenant = AuthService::new(state.pool())
        .login(&req.email, &req.password)
        .await?;
    let token = issue_token(
        tenant.id,
        &state.config().jwt_secret,
        state.config().jwt_expiry_hours,
    )?;

    Ok(Json(SessionResponse {
        success: true,
        token,
        tenant: tenant.profile(),
    }))
}

/// `GET /api/auth/profile`
pub async fn profile(AuthTenant(tenant): AuthTenant) -> Json<Value> {
    Json(json!({"success": true, "tenant": tenant.profile()}))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub store_name: Option<String>,
    pub store_access_token: Option<String>,
}

/// `PUT /api/auth/profile`
///
/// A new store name re-derives the store URL; omitted fields are unchanged.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthTenant(tenant): AuthTenant,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    if let Some(name) = req.store_name.as_deref()
        && name.trim().is_empty()
    {
        return Err(AppError::BadRequest("store name cannot be empty".to_string()));
    }

    let updated = TenantRepository::new(state.pool())
        .update_profile(
            tenant.id,
            req.store_name.as_deref().map(str::trim),
            req.store_access_token.as_deref(),
        )
        .await?;

    Ok(Json(json!({"success": true, "tenant": updated.profile()})))
}
