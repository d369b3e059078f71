// ABOUTME: Worker lifecycle: the launcher seam and the manager that drives it.
// ABOUTME: Re-exports the types used by the HTTP and Discord surfaces.

pub mod launcher;
pub mod manager;

pub use launcher::{LaunchSpec, ProcessLauncher, SwarmInstance, SwarmLauncher};
pub use manager::{
    StopOutcome, WorkerManager, WorkerSettings, WorkerState, WorkerStatus,
    DEFAULT_RESTART_INTERVAL,
};
