//! Topic entries and subscription handles
//!
//! This module defines the per-topic state stored in the broker and the
//! handle a subscriber uses to receive messages.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use super::message::{BroadcastMessage, TopicName};

/// Entry for a single topic in the broker
pub struct Topic {
    /// Broadcast sender for fan-out to subscribers
    pub(super) tx: broadcast::Sender<BroadcastMessage>,

    /// Number of active subscribers
    pub(super) subscriber_count: AtomicU32,

    /// Total messages published on this topic
    pub(super) publishes: AtomicU64,

    /// When the topic was created
    pub created_at: Instant,
}

impl Topic {
    /// Create a new topic entry
    pub(super) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);

        Self {
            tx,
            subscriber_count: AtomicU32::new(0),
            publishes: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    /// Get the number of subscribers
    pub fn subscriber_count(&self) -> u32 {
        self.subscriber_count.load(Ordering::Relaxed)
    }

    /// Atomically claim a subscriber slot
    ///
    /// A non-zero `limit` caps the count; the check and the increment are
    /// a single atomic update, so concurrent claims cannot overshoot.
    /// Returns false when the topic is full.
    pub(super) fn try_add_subscriber(&self, limit: u32) -> bool {
        self.subscriber_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |count| {
                if limit > 0 && count >= limit {
                    None
                } else {
                    Some(count + 1)
                }
            })
            .is_ok()
    }

    /// Send a message to all subscribers
    ///
    /// Returns the number of receivers, or 0 if there are none (a topic
    /// with zero subscribers is a no-op sink).
    pub(super) fn send(&self, message: BroadcastMessage) -> usize {
        self.publishes.fetch_add(1, Ordering::Relaxed);
        self.tx.send(message).unwrap_or(0)
    }

    /// Create a receiver registered from this point onward
    pub(super) fn subscribe(&self) -> broadcast::Receiver<BroadcastMessage> {
        self.tx.subscribe()
    }
}

/// Handle for an active topic subscription
///
/// Delivery begins with the first message published after
/// [`Broker::subscribe`](super::Broker::subscribe) returns. Dropping the
/// handle unsubscribes.
pub struct Subscription {
    topic_name: TopicName,
    topic: Arc<Topic>,
    rx: Option<broadcast::Receiver<BroadcastMessage>>,
}

impl Subscription {
    pub(super) fn new(
        topic_name: TopicName,
        topic: Arc<Topic>,
        rx: broadcast::Receiver<BroadcastMessage>,
    ) -> Self {
        Self {
            topic_name,
            topic,
            rx: Some(rx),
        }
    }

    /// The topic this subscription is registered on
    pub fn topic_name(&self) -> &TopicName {
        &self.topic_name
    }

    /// Receive the next message
    ///
    /// Returns `None` once unsubscribed. A subscriber that falls behind
    /// the channel capacity skips the lost messages and continues with the
    /// newest ones; stale content is superseded anyway.
    pub async fn recv(&mut self) -> Option<BroadcastMessage> {
        let rx = self.rx.as_mut()?;

        loop {
            match rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        topic = %self.topic_name,
                        skipped = skipped,
                        "Subscriber lagged, skipping messages"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop delivery immediately
    ///
    /// Idempotent; safe to call concurrently with an in-flight publish, in
    /// which case that delivery is dropped.
    pub fn unsubscribe(&mut self) {
        if self.rx.take().is_some() {
            let prev = self.topic.subscriber_count.fetch_sub(1, Ordering::Relaxed);

            tracing::debug!(
                topic = %self.topic_name,
                subscribers = prev.saturating_sub(1),
                "Subscriber removed"
            );
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Statistics for a topic
#[derive(Debug, Clone)]
pub struct TopicStats {
    /// Number of active subscribers
    pub subscriber_count: u32,
    /// Total messages published
    pub publishes: u64,
}
