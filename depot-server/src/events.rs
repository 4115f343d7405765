//! In-memory event bus for live operation records
//!
//! Fan-out is fire-and-forget over unbounded channels: a slow or vanished
//! subscriber never blocks or fails the publisher, and a subscriber that
//! connects after a publish never sees it. Closed channels are swept on the
//! next publish.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::RwLock;
use tokio::sync::mpsc;

use depot_common::OperationRecord;

/// Identity of a connected observer, stable for the subscription lifetime
pub type SubscriberId = u32;

/// A connected observer's delivery channel
#[derive(Debug)]
struct Subscriber {
    tx: mpsc::UnboundedSender<OperationRecord>,
}

/// Broadcasts operation records to all currently connected observers
#[derive(Debug, Clone)]
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<SubscriberId, Subscriber>>>,
    next_id: Arc<AtomicU32>,
}

impl EventBus {
    /// Create an event bus with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU32::new(1)),
        }
    }

    /// Register a new observer and return its id and receiving end
    pub async fn subscribe(&self) -> (SubscriberId, mpsc::UnboundedReceiver<OperationRecord>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, Subscriber { tx });

        (id, rx)
    }

    /// Remove an observer; further publishes no longer reach it
    pub async fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.remove(&id);
    }

    /// Number of currently connected observers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Deliver a record to every currently connected observer
    pub async fn publish(&self, record: &OperationRecord) {
        self.publish_filtered(record, None).await;
    }

    /// Deliver a record to every observer except `excluded`
    ///
    /// Used for connect/disconnect notifications, which go to all *other*
    /// observers.
    pub async fn publish_except(&self, excluded: SubscriberId, record: &OperationRecord) {
        self.publish_filtered(record, Some(excluded)).await;
    }

    async fn publish_filtered(&self, record: &OperationRecord, excluded: Option<SubscriberId>) {
        let closed: Vec<SubscriberId> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .filter(|(id, _)| Some(**id) != excluded)
                // Ignore send errors; closed channels are collected below
                .filter(|(_, sub)| sub.tx.send(record.clone()).is_err())
                .map(|(id, _)| *id)
                .collect()
        };

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in closed {
                subscribers.remove(&id);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use depot_common::record::OperationKind;

    use super::*;

    fn record(kind: OperationKind) -> OperationRecord {
        OperationRecord::new(kind, "192.0.2.1", Some("a.txt"))
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = EventBus::new();
        let (_id1, mut rx1) = bus.subscribe().await;
        let (_id2, mut rx2) = bus.subscribe().await;

        bus.publish(&record(OperationKind::Uploaded)).await;

        assert_eq!(rx1.recv().await.unwrap().kind, OperationKind::Uploaded);
        assert_eq!(rx2.recv().await.unwrap().kind, OperationKind::Uploaded);
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscriber() {
        let bus = EventBus::new();
        bus.publish(&record(OperationKind::Uploaded)).await;

        let (_id, mut rx) = bus.subscribe().await;
        bus.publish(&record(OperationKind::Deleted)).await;

        // Only the post-subscription record arrives
        assert_eq!(rx.recv().await.unwrap().kind, OperationKind::Deleted);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_except_skips_one() {
        let bus = EventBus::new();
        let (id1, mut rx1) = bus.subscribe().await;
        let (_id2, mut rx2) = bus.subscribe().await;

        bus.publish_except(id1, &record(OperationKind::Connected))
            .await;

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.recv().await.unwrap().kind, OperationKind::Connected);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let (id, mut rx) = bus.subscribe().await;

        bus.unsubscribe(id).await;
        bus.publish(&record(OperationKind::Uploaded)).await;

        // Channel is closed with nothing buffered
        assert!(rx.recv().await.is_none());
        assert_eq!(bus.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_swept() {
        let bus = EventBus::new();
        let (_id1, rx1) = bus.subscribe().await;
        let (_id2, mut rx2) = bus.subscribe().await;
        drop(rx1);

        // Publishing to the dead channel neither blocks nor errors,
        // and the dead subscriber is removed
        bus.publish(&record(OperationKind::Uploaded)).await;
        assert_eq!(bus.subscriber_count().await, 1);
        assert_eq!(rx2.recv().await.unwrap().kind, OperationKind::Uploaded);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let bus = EventBus::new();
        let (id1, _rx1) = bus.subscribe().await;
        let (id2, _rx2) = bus.subscribe().await;
        let (id3, _rx3) = bus.subscribe().await;

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
    }
}
