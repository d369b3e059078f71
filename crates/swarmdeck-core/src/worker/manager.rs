// ABOUTME: Owns the slot set and the single live swarm instance.
// ABOUTME: Full relaunch on every membership change, cancellable periodic restart, best-effort teardown.

use super::launcher::{LaunchSpec, SwarmInstance, SwarmLauncher};
use crate::error::{PanelError, Result};
use crate::feed::LogFeed;
use crate::slots::{self, SlotSet, MAX_SLOTS};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default interval between blind restarts.
pub const DEFAULT_RESTART_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Lifecycle of the worker: `Idle → Starting → Running → (Restarting →
/// Running)* → Stopping → Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    #[default]
    Idle,
    Starting,
    Running,
    Restarting,
    Stopping,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkerState::Idle => "idle",
            WorkerState::Starting => "starting",
            WorkerState::Running => "running",
            WorkerState::Restarting => "restarting",
            WorkerState::Stopping => "stopping",
        };
        f.write_str(label)
    }
}

/// Static worker configuration.
#[derive(Clone)]
pub struct WorkerSettings {
    /// Credential passed to the swarm client. `None` disables starting.
    pub token: Option<String>,
    pub restart_interval: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            token: None,
            restart_interval: DEFAULT_RESTART_INTERVAL,
        }
    }
}

impl std::fmt::Debug for WorkerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerSettings")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("restart_interval", &self.restart_interval)
            .finish()
    }
}

/// Point-in-time view of the worker, readable without waiting on an
/// in-flight start or stop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub running: bool,
    pub categories: Vec<String>,
    pub slots_used: usize,
    pub slots_max: usize,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub restarts: u64,
}

/// Result of a stop request. Stopping never fails from the caller's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopOutcome {
    /// Whether anything was actually stopped or removed.
    pub stopped: bool,
    pub message: String,
    pub categories: Vec<String>,
}

struct WorkerHandle {
    instance: Box<dyn SwarmInstance>,
    restart: CancellationToken,
    started_at: DateTime<Utc>,
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.restart.cancel();
    }
}

#[derive(Default)]
struct ManagerInner {
    slots: SlotSet,
    handle: Option<WorkerHandle>,
    state: WorkerState,
    restarts: u64,
}

struct Shared {
    ops: Mutex<ManagerInner>,
    status: RwLock<WorkerStatus>,
    launcher: Arc<dyn SwarmLauncher>,
    feed: LogFeed,
    settings: WorkerSettings,
}

/// Handle to the worker lifecycle. Clones share state.
#[derive(Clone)]
pub struct WorkerManager {
    shared: Arc<Shared>,
}

impl WorkerManager {
    pub fn new(launcher: Arc<dyn SwarmLauncher>, feed: LogFeed, settings: WorkerSettings) -> Self {
        let status = WorkerStatus {
            slots_max: MAX_SLOTS,
            ..WorkerStatus::default()
        };
        Self {
            shared: Arc::new(Shared {
                ops: Mutex::new(ManagerInner::default()),
                status: RwLock::new(status),
                launcher,
                feed,
                settings,
            }),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token().is_ok()
    }

    fn token(&self) -> Result<String> {
        match self.shared.settings.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(PanelError::Configuration(
                "no API token configured (set SWARMDECK_API_TOKEN)".into(),
            )),
        }
    }

    pub fn status(&self) -> WorkerStatus {
        self.shared
            .status
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Add a category and (re)launch the swarm with the updated slot set.
    /// Returns the slot set after the change.
    pub async fn start(&self, category: &str) -> Result<Vec<String>> {
        let id = slots::normalize(category)?;
        let token = self.token()?;

        let mut inner = self.shared.ops.lock().await;
        inner.slots.insert(&id)?;

        let state = if inner.handle.is_some() {
            WorkerState::Restarting
        } else {
            WorkerState::Starting
        };

        if let Err(e) = self.relaunch(&mut inner, &token, state).await {
            inner.slots.remove(&id);
            self.sync_status(&inner);
            return Err(e);
        }

        info!(category = %id, slots = inner.slots.len(), "Category started");
        Ok(inner.slots.to_vec())
    }

    /// Stop one category, or everything when `category` is `None` or blank.
    pub async fn stop(&self, category: Option<&str>) -> StopOutcome {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let mut inner = self.shared.ops.lock().await;

        let Some(id) = category else {
            let had_work = inner.handle.is_some() || !inner.slots.is_empty();
            self.teardown(&mut inner).await;
            inner.slots.clear();
            inner.state = WorkerState::Idle;
            self.sync_status(&inner);
            if had_work {
                self.shared.feed.ingest("Swarm stopped");
                info!("Swarm stopped");
            }
            return StopOutcome {
                stopped: had_work,
                message: if had_work {
                    "Stopped all categories".to_string()
                } else {
                    "Nothing to stop".to_string()
                },
                categories: Vec::new(),
            };
        };

        if !inner.slots.remove(id) {
            return StopOutcome {
                stopped: false,
                message: format!("Category {id} is not active, nothing to stop"),
                categories: inner.slots.to_vec(),
            };
        }
        info!(category = %id, remaining = inner.slots.len(), "Category stopped");

        if inner.slots.is_empty() {
            self.teardown(&mut inner).await;
            inner.state = WorkerState::Idle;
            self.sync_status(&inner);
            self.shared.feed.ingest("Swarm stopped");
        } else if let Err(e) = self.relaunch_remaining(&mut inner).await {
            warn!(error = %e, "Relaunch after category stop failed");
        }

        StopOutcome {
            stopped: true,
            message: format!("Stopped category {id}"),
            categories: inner.slots.to_vec(),
        }
    }

    async fn relaunch_remaining(&self, inner: &mut ManagerInner) -> Result<()> {
        let token = match self.token() {
            Ok(token) => token,
            Err(e) => {
                self.teardown(inner).await;
                inner.state = WorkerState::Idle;
                self.sync_status(inner);
                return Err(e);
            }
        };
        self.relaunch(inner, &token, WorkerState::Restarting).await
    }

    /// Tear down any live instance and launch a fresh one for the current
    /// slot set. On failure the manager is left idle with no handle.
    async fn relaunch(
        &self,
        inner: &mut ManagerInner,
        token: &str,
        transitional: WorkerState,
    ) -> Result<()> {
        inner.state = transitional;
        self.sync_status(inner);
        self.teardown(inner).await;

        let spec = LaunchSpec {
            token: token.to_string(),
            categories: inner.slots.to_vec(),
        };

        inner.state = transitional;
        self.sync_status(inner);
        match self
            .shared
            .launcher
            .launch(&spec, self.shared.feed.clone())
            .await
        {
            Ok(instance) => {
                let restart = CancellationToken::new();
                tokio::spawn(restart_loop(
                    Arc::downgrade(&self.shared),
                    restart.clone(),
                    self.shared.settings.restart_interval,
                ));
                inner.handle = Some(WorkerHandle {
                    instance,
                    restart,
                    started_at: Utc::now(),
                });
                inner.state = WorkerState::Running;
                self.sync_status(inner);
                self.shared.feed.ingest(&format!(
                    "Swarm running with {} slot(s)",
                    inner.slots.len()
                ));
                Ok(())
            }
            Err(e) => {
                inner.state = WorkerState::Idle;
                self.sync_status(inner);
                warn!(error = %e, "Swarm launch failed");
                self.shared
                    .feed
                    .ingest(&format!("[ERROR] Swarm failed to start: {e}"));
                Err(e)
            }
        }
    }

    /// Best-effort shutdown of the live instance. Cancels its restart timer.
    async fn teardown(&self, inner: &mut ManagerInner) {
        let Some(mut handle) = inner.handle.take() else {
            return;
        };
        inner.state = WorkerState::Stopping;
        self.sync_status(inner);
        handle.restart.cancel();
        if let Err(e) = handle.instance.shutdown().await {
            warn!(error = %e, "Swarm shutdown failed, continuing");
        }
    }

    /// Timer-driven restart of the current handle, in place.
    /// Returns whether the timer should keep running.
    async fn periodic_restart(&self, timer: &CancellationToken) -> bool {
        let mut inner = self.shared.ops.lock().await;
        // A stop or relaunch may have won the race for the lock.
        if timer.is_cancelled() {
            return false;
        }
        let token = match self.token() {
            Ok(token) => token,
            Err(_) => return false,
        };
        let spec = LaunchSpec {
            token,
            categories: inner.slots.to_vec(),
        };

        inner.state = WorkerState::Restarting;
        self.sync_status(&inner);

        let Some(handle) = inner.handle.as_mut() else {
            return false;
        };
        if let Err(e) = handle.instance.shutdown().await {
            warn!(error = %e, "Swarm shutdown before scheduled restart failed, continuing");
        }

        match self
            .shared
            .launcher
            .launch(&spec, self.shared.feed.clone())
            .await
        {
            Ok(instance) => {
                handle.instance = instance;
                handle.started_at = Utc::now();
                inner.restarts += 1;
                inner.state = WorkerState::Running;
                self.sync_status(&inner);
                info!(restarts = inner.restarts, "Scheduled swarm restart complete");
                self.shared.feed.ingest("Swarm restarted (scheduled)");
                true
            }
            Err(e) => {
                inner.handle = None;
                inner.state = WorkerState::Idle;
                self.sync_status(&inner);
                warn!(error = %e, "Scheduled swarm restart failed");
                self.shared
                    .feed
                    .ingest(&format!("[ERROR] Scheduled restart failed: {e}"));
                false
            }
        }
    }

    fn sync_status(&self, inner: &ManagerInner) {
        let status = WorkerStatus {
            state: inner.state,
            running: inner.handle.is_some(),
            categories: inner.slots.to_vec(),
            slots_used: inner.slots.len(),
            slots_max: MAX_SLOTS,
            pid: inner.handle.as_ref().and_then(|h| h.instance.pid()),
            started_at: inner.handle.as_ref().map(|h| h.started_at),
            restarts: inner.restarts,
        };
        *self
            .shared
            .status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }
}

async fn restart_loop(shared: Weak<Shared>, timer: CancellationToken, interval: Duration) {
    loop {
        tokio::select! {
            _ = timer.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let manager = WorkerManager { shared };
        if !manager.periodic_restart(&timer).await {
            return;
        }
    }
}
