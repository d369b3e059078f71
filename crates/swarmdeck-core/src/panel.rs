// ABOUTME: The Panel context object: all shared state behind one Arc-able value.
// ABOUTME: Worker manager, log feed, command queue and the online flag, with the operations surfaces call.

use crate::config::Config;
use crate::error::{PanelError, Result};
use crate::feed::LogFeed;
use crate::hub::LogHub;
use crate::queue::CommandQueue;
use crate::rewrite::{Pipeline, RuleSet};
use crate::worker::{
    ProcessLauncher, StopOutcome, SwarmLauncher, WorkerManager, WorkerSettings, WorkerStatus,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything the HTTP and Discord surfaces operate on.
#[derive(Clone)]
pub struct Panel {
    workers: WorkerManager,
    feed: LogFeed,
    commands: CommandQueue,
    online: Arc<AtomicBool>,
}

/// Status report shared by `GET /status` and the Discord `status` command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelStatus {
    pub online: bool,
    pub logs_visible: bool,
    pub subscribers: usize,
    pub pending_commands: usize,
    pub token_configured: bool,
    #[serde(flatten)]
    pub worker: WorkerStatus,
}

impl Panel {
    pub fn new(
        launcher: Arc<dyn SwarmLauncher>,
        rules: RuleSet,
        backlog: usize,
        settings: WorkerSettings,
    ) -> Self {
        let feed = LogFeed::new(Pipeline::new(rules), LogHub::with_backlog(backlog));
        let workers = WorkerManager::new(launcher, feed.clone(), settings);
        Self {
            workers,
            feed,
            commands: CommandQueue::new(),
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Build a panel from configuration with the child-process launcher.
    pub fn from_config(config: &Config) -> Result<Self> {
        let rules = match &config.logs.rules {
            Some(path) => RuleSet::load(path)?,
            None => RuleSet::builtin()?,
        };
        let launcher = ProcessLauncher::new(config.swarm.command.clone(), config.swarm.args.clone())
            .with_working_dir(config.swarm.working_dir_expanded());
        let settings = WorkerSettings {
            token: config.swarm.api_token.clone(),
            restart_interval: config.swarm.restart_interval(),
        };
        Ok(Self::new(
            Arc::new(launcher),
            rules,
            config.logs.backlog,
            settings,
        ))
    }

    pub fn workers(&self) -> &WorkerManager {
        &self.workers
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Start a category. Refused while the panel is offline.
    pub async fn start(&self, category: &str) -> Result<Vec<String>> {
        if !self.is_online() {
            return Err(PanelError::Offline);
        }
        self.workers.start(category).await
    }

    pub async fn stop(&self, category: Option<&str>) -> StopOutcome {
        self.workers.stop(category).await
    }

    /// Mark the panel offline and stop everything.
    pub async fn shutdown(&self) -> StopOutcome {
        self.online.store(false, Ordering::Relaxed);
        tracing::warn!("Panel marked offline");
        self.feed.ingest("[WARN] Panel is shutting down");
        self.workers.stop(None).await
    }

    /// Mark the panel online again. Returns whether it was offline.
    pub fn bring_online(&self) -> bool {
        let was_offline = !self.online.swap(true, Ordering::Relaxed);
        if was_offline {
            tracing::info!("Panel marked online");
            self.feed.ingest("Panel is back online");
        }
        was_offline
    }

    pub fn status(&self) -> PanelStatus {
        PanelStatus {
            online: self.is_online(),
            logs_visible: self.feed.is_visible(),
            subscribers: self.feed.hub().subscriber_count(),
            pending_commands: self.commands.len(),
            token_configured: self.workers.has_token(),
            worker: self.workers.status(),
        }
    }
}
