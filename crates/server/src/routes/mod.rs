//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (checks the database)
//!
//! # Auth (rate limited)
//! POST /api/auth/register               - Create a tenant account
//! POST /api/auth/login                  - Password login, returns a JWT
//! GET  /api/auth/profile                - Current tenant profile
//! PUT  /api/auth/profile                - Update store name / access token
//!
//! # Sync
//! POST /api/sync                        - Trigger a sync for the tenant
//! GET  /api/sync/status                 - Last sync info for the tenant
//! GET  /api/sync/jobs                   - Scheduled job registry
//!
//! # Analytics
//! GET  /api/analytics/dashboard         - Headline totals
//! GET  /api/analytics/orders-by-date    - Bucketed counts and revenue
//! GET  /api/analytics/top-customers     - By lifetime spend
//! GET  /api/analytics/top-products      - By units sold
//! ```

pub mod analytics;
pub mod auth;
pub mod health;
pub mod sync;

use axum::Router;
use axum::routing::{get, post, put};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes)
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/auth/profile", put(auth::update_profile))
        .route("/api/sync", post(sync::trigger))
        .route("/api/sync/status", get(sync::status))
        .route("/api/sync/jobs", get(sync::jobs))
        .route("/api/analytics/dashboard", get(analytics::dashboard))
        .route("/api/analytics/orders-by-date", get(analytics::orders_by_date))
        .route("/api/analytics/top-customers", get(analytics::top_customers))
        .route("/api/analytics/top-products", get(analytics::top_products))
}
