//! Bearer-token authentication extractor.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::TenantRepository;
use crate::models::Tenant;
use crate::services::auth::verify_token;
use crate::state::AppState;

/// Extractor that requires a valid tenant session token.
///
/// Reads `Authorization: Bearer <jwt>`, verifies the signature and expiry,
/// and loads the tenant. Inactive and deleted tenants are rejected.
///
/// ```rust,ignore
/// async fn handler(AuthTenant(tenant): AuthTenant) -> impl IntoResponse {
///     format!("hello, {}", tenant.store_name)
/// }
/// ```
pub struct AuthTenant(pub Tenant);

/// Why an authenticated request was rejected.
pub enum AuthRejection {
    /// Token missing, malformed, expired, or tenant gone.
    Unauthorized,
    /// Tenant exists but is deactivated.
    Inactive,
    /// Tenant lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "authentication required"),
            Self::Inactive => (StatusCode::FORBIDDEN, "account is deactivated"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(json!({"success": false, "message": message}))).into_response()
    }
}

impl FromRequestParts<AppState> for AuthTenant {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AuthRejection::Unauthorized)?;

        let tenant_id = verify_token(token, &state.config().jwt_secret)
            .map_err(|_| AuthRejection::Unauthorized)?;

        let tenant = TenantRepository::new(state.pool())
            .get_by_id(tenant_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "tenant lookup failed during auth");
                AuthRejection::Internal
            })?
            .ok_or(AuthRejection::Unauthorized)?;

        if !tenant.is_active {
            return Err(AuthRejection::Inactive);
        }

        Ok(Self(tenant))
    }
}
