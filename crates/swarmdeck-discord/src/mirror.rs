// ABOUTME: Mirrors the processed log stream into a Discord channel.
// ABOUTME: Batches lines on an interval and splits them into messages under the length cap.

use crate::rest::DiscordRest;
use std::time::Duration;
use swarmdeck_core::Subscription;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Discord's per-message content limit, in characters.
pub const MESSAGE_LIMIT: usize = 2000;
/// How long lines accumulate before a batch is posted.
pub const BATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Join lines into messages of at most `limit` characters each.
/// A single line longer than `limit` is truncated.
pub fn chunk_lines(lines: &[String], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let line: String = line.chars().take(limit).collect();
        let len = line.chars().count();
        let needed = if current.is_empty() { len } else { len + 1 };
        if !current.is_empty() && current_len + needed > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(&line);
        current_len += len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Forward subscription lines to `channel_id` until the hub goes away.
pub async fn run_mirror(
    rest: DiscordRest,
    channel_id: String,
    mut subscription: Subscription,
    interval: Duration,
) {
    info!(channel_id = %channel_id, "Mirroring logs to Discord channel");
    while let Some(first) = subscription.recv().await {
        let mut batch = vec![first];
        tokio::time::sleep(interval).await;
        while let Some(line) = subscription.try_recv() {
            batch.push(line);
        }

        for chunk in chunk_lines(&batch, MESSAGE_LIMIT) {
            if let Err(e) = rest.post_message(&channel_id, &chunk).await {
                warn!(error = %e, lines = batch.len(), "Failed to mirror log batch, dropping it");
                break;
            }
        }
    }
    info!("Log hub closed, mirror stopped");
}

pub fn spawn_mirror(rest: DiscordRest, channel_id: String, subscription: Subscription) -> JoinHandle<()> {
    tokio::spawn(run_mirror(rest, channel_id, subscription, BATCH_INTERVAL))
}
