// ABOUTME: Entry point for all user-facing log text.
// ABOUTME: Runs raw output through the rewrite pipeline and publishes surviving lines to the hub.

use crate::hub::{LogHub, Subscription};
use crate::rewrite::Pipeline;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheaply cloneable handle used by launchers and the worker manager to emit
/// text, and by transports to subscribe.
#[derive(Debug, Clone)]
pub struct LogFeed {
    pipeline: Arc<Pipeline>,
    hub: LogHub,
    visible: Arc<AtomicBool>,
}

impl LogFeed {
    pub fn new(pipeline: Pipeline, hub: LogHub) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            hub,
            visible: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Rewrite a raw blob and publish whatever survives.
    /// Returns the lines that were produced, published or not.
    pub fn ingest(&self, raw: &str) -> Vec<String> {
        let lines = self.pipeline.process(raw);
        if self.is_visible() {
            for line in &lines {
                self.hub.publish(line);
            }
        }
        lines
    }

    /// Publish a line that is already in display form, skipping the pipeline.
    pub fn publish_raw(&self, line: &str) {
        if self.is_visible() {
            self.hub.publish(line);
        }
    }

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    pub fn hub(&self) -> &LogHub {
        &self.hub
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// Toggle fan-out. Hidden lines are dropped, not buffered.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
        tracing::info!(visible, "Log visibility changed");
    }
}
