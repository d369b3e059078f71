// ABOUTME: Seam between the panel and the external swarm client.
// ABOUTME: SwarmLauncher/SwarmInstance traits plus a child-process implementation that pipes output into the feed.

use crate::error::{PanelError, Result};
use crate::feed::LogFeed;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

/// Everything a launcher needs to bring up one swarm instance.
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub token: String,
    pub categories: Vec<String>,
}

impl std::fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchSpec")
            .field("token", &"[REDACTED]")
            .field("categories", &self.categories)
            .finish()
    }
}

/// A running swarm client.
#[async_trait]
pub trait SwarmInstance: Send + Sync {
    /// Stop the client. Callers treat failures as best-effort.
    async fn shutdown(&mut self) -> Result<()>;

    /// OS process id, when the instance is a child process.
    fn pid(&self) -> Option<u32> {
        None
    }
}

/// Factory for swarm client instances.
#[async_trait]
pub trait SwarmLauncher: Send + Sync {
    async fn launch(&self, spec: &LaunchSpec, feed: LogFeed) -> Result<Box<dyn SwarmInstance>>;
}

// =============================================================================
// Child-process launcher
// =============================================================================

/// Launches the swarm client as a child process.
///
/// The token and categories are passed via `SWARMDECK_API_TOKEN` and
/// `SWARMDECK_CATEGORIES` (comma-joined). Stdout and stderr are read line by
/// line and fed into the rewrite pipeline.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

#[async_trait]
impl SwarmLauncher for ProcessLauncher {
    async fn launch(&self, spec: &LaunchSpec, feed: LogFeed) -> Result<Box<dyn SwarmInstance>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env("SWARMDECK_API_TOKEN", &spec.token)
            .env("SWARMDECK_CATEGORIES", spec.categories.join(","))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| PanelError::Launch(format!("{}: {}", self.program, e)))?;

        let pid = child.id();
        tracing::info!(program = %self.program, pid = ?pid, categories = spec.categories.len(), "Spawned swarm client");

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, feed.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, feed));
        }

        Ok(Box::new(ChildInstance { child, pid }))
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, feed: LogFeed) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        feed.ingest(&line);
    }
}

struct ChildInstance {
    child: Child,
    pid: Option<u32>,
}

#[async_trait]
impl SwarmInstance for ChildInstance {
    async fn shutdown(&mut self) -> Result<()> {
        // Already exited: nothing to kill.
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        self.child.kill().await?;
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::LogHub;
    use crate::rewrite::{Pipeline, RuleSet};
    use std::time::Duration;

    fn feed() -> LogFeed {
        LogFeed::new(Pipeline::new(RuleSet::builtin().unwrap()), LogHub::new())
    }

    #[test]
    fn debug_redacts_token() {
        let spec = LaunchSpec {
            token: "secret-token".into(),
            categories: vec!["a".into()],
        };
        let rendered = format!("{spec:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("REDACTED"));
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let launcher = ProcessLauncher::new("/definitely/not/a/real/binary", vec![]);
        let spec = LaunchSpec {
            token: "t".into(),
            categories: vec![],
        };
        match launcher.launch(&spec, feed()).await {
            Err(PanelError::Launch(msg)) => assert!(msg.contains("/definitely/not")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("launch should fail"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_output_reaches_subscribers() {
        let feed = feed();
        let mut sub = feed.subscribe();
        let launcher = ProcessLauncher::new(
            "sh",
            vec![
                "-c".into(),
                "echo \"starting shard with ID: $SWARMDECK_CATEGORIES\"; sleep 5".into(),
            ],
        );
        let spec = LaunchSpec {
            token: "t".into(),
            categories: vec!["a".into(), "b".into()],
        };

        let mut instance = launcher.launch(&spec, feed.clone()).await.unwrap();
        assert!(instance.pid().is_some());

        let line = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("line before timeout")
            .expect("hub open");
        assert!(line.ends_with("starting bot with ID: [a,b]"), "{line}");

        instance.shutdown().await.unwrap();
        // Second shutdown finds the process gone.
        instance.shutdown().await.unwrap();
    }
}
