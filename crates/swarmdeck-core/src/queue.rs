// ABOUTME: FIFO queue of free-text commands for an external automation consumer.
// ABOUTME: Consumers fetch the oldest pending command and acknowledge it by id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Upper bound on pending commands; the oldest are dropped past it.
pub const MAX_PENDING: usize = 100;

/// A command waiting to be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedCommand {
    pub id: Uuid,
    pub text: String,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: Arc<Mutex<VecDeque<QueuedCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<QueuedCommand>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a command. Blank text is ignored and yields `None`.
    pub fn enqueue(&self, text: &str) -> Option<QueuedCommand> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let command = QueuedCommand {
            id: Uuid::new_v4(),
            text: text.to_string(),
            queued_at: Utc::now(),
        };
        let mut pending = self.lock();
        if pending.len() >= MAX_PENDING {
            if let Some(dropped) = pending.pop_front() {
                tracing::warn!(id = %dropped.id, "Command queue full, dropping oldest");
            }
        }
        pending.push_back(command.clone());
        tracing::info!(id = %command.id, pending = pending.len(), "Command queued");
        Some(command)
    }

    /// Oldest unacknowledged command, left in place until acked.
    pub fn peek(&self) -> Option<QueuedCommand> {
        self.lock().front().cloned()
    }

    /// Remove the command with `id`. Returns whether it was pending.
    pub fn ack(&self, id: Uuid) -> bool {
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|c| c.id != id);
        let removed = pending.len() != before;
        if removed {
            tracing::info!(%id, "Command acknowledged");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_and_ack() {
        let queue = CommandQueue::new();
        let first = queue.enqueue("open lobby").unwrap();
        let second = queue.enqueue("  invite bob ").unwrap();
        assert_eq!(second.text, "invite bob");

        assert_eq!(queue.peek(), Some(first.clone()));
        // Peek does not consume.
        assert_eq!(queue.peek(), Some(first.clone()));

        assert!(queue.ack(first.id));
        assert_eq!(queue.peek(), Some(second.clone()));
        assert!(!queue.ack(first.id));
        assert!(queue.ack(second.id));
        assert!(queue.is_empty());
    }

    #[test]
    fn ack_out_of_order() {
        let queue = CommandQueue::new();
        let a = queue.enqueue("a").unwrap();
        let b = queue.enqueue("b").unwrap();
        assert!(queue.ack(b.id));
        assert_eq!(queue.peek().map(|c| c.id), Some(a.id));
    }

    #[test]
    fn blank_text_is_ignored() {
        let queue = CommandQueue::new();
        assert!(queue.enqueue("   ").is_none());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn overflow_drops_oldest() {
        let queue = CommandQueue::new();
        let first = queue.enqueue("cmd-0").unwrap();
        for i in 1..=MAX_PENDING {
            queue.enqueue(&format!("cmd-{i}"));
        }
        assert_eq!(queue.len(), MAX_PENDING);
        assert_ne!(queue.peek().map(|c| c.id), Some(first.id));
        assert_eq!(queue.peek().map(|c| c.text), Some("cmd-1".to_string()));
    }

    #[test]
    fn serializes_camel_case() {
        let queue = CommandQueue::new();
        let cmd = queue.enqueue("x").unwrap();
        let json = serde_json::to_value(&cmd).unwrap();
        assert!(json.get("queuedAt").is_some());
        assert_eq!(json["text"], "x");
    }
}
