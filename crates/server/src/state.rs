//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::shopify::ShopifyFactory;
use crate::sync::{PgStore, SyncScheduler, SyncService};

/// The engine as wired in production.
pub type AppSyncService = SyncService<PgStore, ShopifyFactory>;
/// The scheduler as wired in production.
pub type AppScheduler = SyncScheduler<PgStore, ShopifyFactory>;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    sync: Arc<AppSyncService>,
    scheduler: Arc<AppScheduler>,
}

impl AppState {
    /// Wire up the engine and scheduler from configuration.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let sync = Arc::new(SyncService::new(
            PgStore::new(pool.clone()),
            ShopifyFactory::new(config.store_api_version.clone()),
            config.sync_batch_size,
        ));
        let scheduler = Arc::new(SyncScheduler::new(
            Arc::clone(&sync),
            config.sync_interval_hours,
        ));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sync,
                scheduler,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the reconciliation engine.
    #[must_use]
    pub fn sync(&self) -> &AppSyncService {
        &self.inner.sync
    }

    /// Get a reference to the scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &AppScheduler {
        &self.inner.scheduler
    }
}
