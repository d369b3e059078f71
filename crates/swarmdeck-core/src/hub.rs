// ABOUTME: Fan-out of finished log lines to every connected subscriber.
// ABOUTME: Unbounded per-subscriber channels, dead sinks pruned on publish, optional replay backlog.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;

/// Identifier handed out by `LogHub::subscribe`.
pub type SubscriberId = u64;

#[derive(Debug, Default)]
struct HubInner {
    next_id: SubscriberId,
    sinks: HashMap<SubscriberId, mpsc::UnboundedSender<String>>,
    backlog: VecDeque<String>,
    backlog_cap: usize,
}

/// Shared subscriber registry. Cloning yields another handle to the same hub.
#[derive(Debug, Clone, Default)]
pub struct LogHub {
    inner: Arc<Mutex<HubInner>>,
}

impl LogHub {
    /// A hub without replay.
    pub fn new() -> Self {
        Self::with_backlog(0)
    }

    /// A hub that replays up to `cap` recent lines to each new subscriber.
    pub fn with_backlog(cap: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                backlog: VecDeque::with_capacity(cap),
                backlog_cap: cap,
                ..HubInner::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        lock(&self.inner)
    }

    /// Register a new sink. Dropping the returned subscription unregisters it.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        for line in &inner.backlog {
            // Receiver is still in hand; this cannot fail.
            let _ = tx.send(line.clone());
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.sinks.insert(id, tx);
        tracing::debug!(subscriber = id, total = inner.sinks.len(), "Log subscriber added");

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a sink. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.lock().sinks.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber = id, "Log subscriber removed");
        }
        removed
    }

    /// Deliver a line to every sink. Sinks whose receiver is gone are dropped;
    /// a failed sink never affects the others.
    pub fn publish(&self, line: &str) {
        let mut inner = self.lock();
        if inner.backlog_cap > 0 {
            if inner.backlog.len() == inner.backlog_cap {
                inner.backlog.pop_front();
            }
            inner.backlog.push_back(line.to_string());
        }
        inner
            .sinks
            .retain(|_, tx| tx.send(line.to_string()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().sinks.len()
    }
}

/// A live subscription. Lines arrive in publish order.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<String>,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next line. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Non-blocking receive, used by tests and batchers.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            lock(&inner).sinks.remove(&self.id);
        }
    }
}

/// The hub only holds plain data, so a poisoned lock is still usable.
fn lock(inner: &Mutex<HubInner>) -> MutexGuard<'_, HubInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_gets_every_line() {
        let hub = LogHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish("one");
        hub.publish("two");

        assert_eq!(a.recv().await.as_deref(), Some("one"));
        assert_eq!(a.recv().await.as_deref(), Some("two"));
        assert_eq!(b.recv().await.as_deref(), Some("one"));
        assert_eq!(b.recv().await.as_deref(), Some("two"));
    }

    #[test]
    fn late_subscriber_sees_only_new_lines() {
        let hub = LogHub::new();
        hub.publish("before");
        let mut sub = hub.subscribe();
        hub.publish("after");
        assert_eq!(sub.try_recv().as_deref(), Some("after"));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let hub = LogHub::new();
        let sub = hub.subscribe();
        let _keep = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn explicit_unsubscribe() {
        let hub = LogHub::new();
        let sub = hub.subscribe();
        assert!(hub.unsubscribe(sub.id()));
        assert!(!hub.unsubscribe(sub.id()));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn closed_receiver_is_pruned_and_others_unaffected() {
        let hub = LogHub::new();
        let mut healthy = hub.subscribe();
        let mut broken = hub.subscribe();
        broken.rx.close();

        hub.publish("still flowing");

        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(healthy.try_recv().as_deref(), Some("still flowing"));
    }

    #[test]
    fn backlog_is_bounded_and_replayed() {
        let hub = LogHub::with_backlog(2);
        hub.publish("a");
        hub.publish("b");
        hub.publish("c");

        let mut sub = hub.subscribe();
        assert_eq!(sub.try_recv().as_deref(), Some("b"));
        assert_eq!(sub.try_recv().as_deref(), Some("c"));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn ids_are_unique() {
        let hub = LogHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();
        assert_ne!(a.id(), b.id());
    }
}
