//! Unified error handling for the API surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::sync::SyncError;

/// Application-level error for route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Sync run failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Authentication failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures go to Sentry; client errors are just responses.
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "request failed");
        }

        let mut body = json!({
            "success": false,
            "message": self.client_message(),
        });
        if let Self::Sync(SyncError::MissingCredentials {
            access_token,
            store_url,
        }) = &self
        {
            body["missingCredentials"] = json!({
                "accessToken": access_token,
                "storeUrl": store_url,
            });
        }

        (status, Json(body)).into_response()
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Sync(e) => match e {
                SyncError::TenantNotFound => StatusCode::NOT_FOUND,
                SyncError::MissingCredentials { .. } => StatusCode::BAD_REQUEST,
                SyncError::AlreadyRunning => StatusCode::CONFLICT,
                SyncError::Transport(_) => StatusCode::BAD_GATEWAY,
                SyncError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::TenantAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to return to clients; internals stay in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_)
            | Self::Sync(SyncError::Storage(_))
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                "Internal server error".to_string()
            }
            Self::Sync(SyncError::Transport(_)) => "Store API request failed".to_string(),
            other => other_message(other),
        }
    }
}

fn other_message(err: &AppError) -> String {
    match err {
        AppError::Sync(e) => e.to_string(),
        AppError::Auth(e) => e.to_string(),
        AppError::NotFound(what) => format!("not found: {what}"),
        AppError::BadRequest(why) => why.clone(),
        AppError::Database(e) => e.to_string(),
    }
}
