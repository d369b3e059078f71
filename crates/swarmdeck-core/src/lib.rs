// ABOUTME: Core library for the swarmdeck control panel.
// ABOUTME: Exports slots, worker lifecycle, rewrite pipeline, log hub, command queue, config and Panel.

pub mod config;
pub mod error;
pub mod feed;
pub mod hub;
pub mod panel;
pub mod queue;
pub mod rewrite;
pub mod slots;
pub mod worker;

pub use config::Config;
pub use error::{PanelError, Result};
pub use feed::LogFeed;
pub use hub::{LogHub, SubscriberId, Subscription};
pub use panel::{Panel, PanelStatus};
pub use queue::{CommandQueue, QueuedCommand};
pub use rewrite::{Pipeline, RuleSet, Verdict};
pub use slots::{SlotSet, MAX_SLOTS};
pub use worker::{
    LaunchSpec, ProcessLauncher, StopOutcome, SwarmInstance, SwarmLauncher, WorkerManager,
    WorkerSettings, WorkerState, WorkerStatus,
};
