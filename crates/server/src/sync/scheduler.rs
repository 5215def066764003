//! Periodic all-tenant sync.
//!
//! A single background task fires on a fixed interval, loads every active
//! tenant, and syncs them one at a time. One tenant's failure is logged and
//! the loop moves on; the scheduler itself never dies from a bad tenant.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, interval_at};
use tracing::{error, info, warn};

use super::source::SourceFactory;
use super::store::SyncStore;
use super::SyncService;

/// Registry name of the periodic all-tenant job.
const JOB_NAME: &str = "tenant-sync";

/// Snapshot of one scheduled job, as returned by the jobs endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub name: &'static str,
    pub running: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct JobState {
    running: bool,
    last_run_at: Option<DateTime<Utc>>,
    next_run_at: Option<DateTime<Utc>>,
}

/// Owns the background task and its shutdown signal.
pub struct SyncScheduler<S, F> {
    service: Arc<SyncService<S, F>>,
    interval: Duration,
    state: Arc<Mutex<JobState>>,
    shutdown: watch::Sender<bool>,
}

impl<S, F> SyncScheduler<S, F>
where
    S: SyncStore + 'static,
    F: SourceFactory + 'static,
{
    /// Create a scheduler firing every `interval_hours` hours.
    #[must_use]
    pub fn new(service: Arc<SyncService<S, F>>, interval_hours: u64) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            service,
            interval: Duration::from_secs(interval_hours * 3600),
            state: Arc::new(Mutex::new(JobState::default())),
            shutdown,
        }
    }

    /// Spawn the periodic task. The first tick fires one full interval from
    /// now; startup never triggers an immediate sync.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let period = self.interval;
        let mut shutdown = self.shutdown.subscribe();

        info!(job = JOB_NAME, interval_secs = period.as_secs(), "scheduler started");
        set_next_run(&state, period);

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_all(&service, &state).await;
                        set_next_run(&state, period);
                    }
                    _ = shutdown.changed() => {
                        info!(job = JOB_NAME, "scheduler stopped");
                        break;
                    }
                }
            }
        })
    }

    /// Signal the background task to exit after its current work.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Sync every active tenant once, now. Shares the run bookkeeping with
    /// the periodic task.
    pub async fn run_once(&self) {
        run_all(&self.service, &self.state).await;
    }

    /// Status of every registered job (currently just the one).
    #[must_use]
    pub fn status(&self) -> Vec<JobStatus> {
        let state = lock(&self.state);
        vec![JobStatus {
            name: JOB_NAME,
            running: state.running,
            last_run_at: state.last_run_at,
            next_run_at: state.next_run_at,
        }]
    }
}

fn lock(state: &Mutex<JobState>) -> std::sync::MutexGuard<'_, JobState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_next_run(state: &Arc<Mutex<JobState>>, period: Duration) {
    if let Ok(period) = chrono::Duration::from_std(period) {
        lock(state).next_run_at = Some(Utc::now() + period);
    }
}

/// One full pass over the active tenants, sequential, failure-isolated.
async fn run_all<S, F>(service: &SyncService<S, F>, state: &Arc<Mutex<JobState>>)
where
    S: SyncStore,
    F: SourceFactory,
{
    lock(state).running = true;

    let tenants = match service.store().active_tenants().await {
        Ok(tenants) => tenants,
        Err(e) => {
            error!(job = JOB_NAME, error = %e, "could not load active tenants");
            let mut s = lock(state);
            s.running = false;
            s.last_run_at = Some(Utc::now());
            return;
        }
    };

    info!(job = JOB_NAME, tenants = tenants.len(), "scheduled sync pass starting");
    for tenant in tenants {
        match service.sync_tenant(tenant.id).await {
            Ok(stats) => info!(
                tenant_id = %tenant.id,
                written = stats.customers.written()
                    + stats.products.written()
                    + stats.orders.written()
                    + stats.order_items.written(),
                errors = stats.total_errors(),
                "tenant synced"
            ),
            Err(e) => warn!(tenant_id = %tenant.id, error = %e, "tenant sync failed"),
        }
    }

    let mut s = lock(state);
    s.running = false;
    s.last_run_at = Some(Utc::now());
}
