//! Broker implementation
//!
//! The central broker that owns all live topics and routes published
//! messages to current subscribers.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Error, Result};

use super::config::BrokerConfig;
use super::message::{BroadcastMessage, TopicName};
use super::topic::{Subscription, Topic, TopicStats};

/// Central broker for all screen topics
///
/// Thread-safe via `RwLock`. Topics are created on demand by both publish
/// and subscribe; independent topics have no cross-talk.
pub struct Broker {
    /// Map of topic name to topic entry
    topics: RwLock<HashMap<TopicName, Arc<Topic>>>,

    /// Configuration
    config: BrokerConfig,
}

impl Broker {
    /// Create a new broker with default configuration
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Create a new broker with custom configuration
    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the broker configuration
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Publish a message on a topic
    ///
    /// Delivers to every subscriber currently registered on the topic, in
    /// publish order with respect to other publishes on the same topic.
    /// Messages are never queued for late joiners. Returns the number of
    /// subscribers the message was handed to.
    pub async fn publish(&self, name: &TopicName, message: BroadcastMessage) -> usize {
        let topic = self.get_or_create(name).await;
        let delivered = topic.send(message);

        tracing::debug!(
            topic = %name,
            delivered = delivered,
            "Message published"
        );

        delivered
    }

    /// Subscribe to a topic
    ///
    /// Registration is synchronous: once this returns, every subsequent
    /// publish on the topic is delivered to the returned handle. Fails with
    /// [`Error::SubscriberLimit`] when the configured per-topic cap is
    /// reached.
    pub async fn subscribe(&self, name: &TopicName) -> Result<Subscription> {
        let topic = self.get_or_create(name).await;

        if !topic.try_add_subscriber(self.config.max_subscribers_per_topic) {
            return Err(Error::SubscriberLimit(name.clone()));
        }

        let rx = topic.subscribe();

        tracing::info!(
            topic = %name,
            subscribers = topic.subscriber_count(),
            "Subscriber added"
        );

        Ok(Subscription::new(name.clone(), topic, rx))
    }

    /// Remove a topic
    ///
    /// Existing subscriptions keep their channel until dropped; future
    /// publishes recreate the topic on demand. Used when a publisher
    /// session shuts down or re-indexes its screens.
    pub async fn remove_topic(&self, name: &TopicName) {
        if self.topics.write().await.remove(name).is_some() {
            tracing::info!(topic = %name, "Topic removed");
        }
    }

    /// Get total number of topics
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    /// Get statistics for a topic
    pub async fn topic_stats(&self, name: &TopicName) -> Option<TopicStats> {
        let topics = self.topics.read().await;

        topics.get(name).map(|topic| TopicStats {
            subscriber_count: topic.subscriber_count(),
            publishes: topic.publishes.load(Ordering::Relaxed),
        })
    }

    async fn get_or_create(&self, name: &TopicName) -> Arc<Topic> {
        {
            let topics = self.topics.read().await;
            if let Some(topic) = topics.get(name) {
                return Arc::clone(topic);
            }
        }

        let mut topics = self.topics.write().await;
        let topic = topics
            .entry(name.clone())
            .or_insert_with(|| {
                tracing::debug!(topic = %name, "Topic created");
                Arc::new(Topic::new(self.config.broadcast_capacity))
            });

        Arc::clone(topic)
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Content, ContentPatch, ScreenId};

    fn update_for(id: &str) -> BroadcastMessage {
        let content = ContentPatch::url(format!("{id}.png")).apply_to(None);
        BroadcastMessage::content_update(ScreenId::new(id), content)
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        let delivered = broker.publish(&topic, update_for("1")).await;

        assert_eq!(delivered, 0);
        assert_eq!(broker.topic_count().await, 1);
    }

    #[tokio::test]
    async fn test_subscribe_then_receive() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        let mut sub = broker.subscribe(&topic).await.unwrap();
        broker.publish(&topic, update_for("1")).await;

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.screen_id(), &ScreenId::new("1"));
    }

    #[tokio::test]
    async fn test_topic_isolation() {
        let broker = Broker::new();
        let topic_a = TopicName::new("screen_a");
        let topic_b = TopicName::new("screen_b");

        let _sub_a = broker.subscribe(&topic_a).await.unwrap();
        let mut sub_b = broker.subscribe(&topic_b).await.unwrap();

        // Publish only on A; B must see nothing
        let delivered = broker.publish(&topic_a, update_for("a")).await;
        assert_eq!(delivered, 1);

        broker.publish(&topic_b, update_for("b")).await;
        let msg = sub_b.recv().await.unwrap();
        assert_eq!(msg.screen_id(), &ScreenId::new("b"));
    }

    #[tokio::test]
    async fn test_fan_out_exactly_once_each() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        let mut subs = Vec::new();
        for _ in 0..5 {
            subs.push(broker.subscribe(&topic).await.unwrap());
        }

        let delivered = broker.publish(&topic, update_for("1")).await;
        assert_eq!(delivered, 5);

        for sub in &mut subs {
            let msg = sub.recv().await.unwrap();
            assert_eq!(msg.screen_id(), &ScreenId::new("1"));

            // Exactly once: no second message pending
            let pending =
                tokio::time::timeout(std::time::Duration::from_millis(20), sub.recv()).await;
            assert!(pending.is_err());
        }
    }

    #[tokio::test]
    async fn test_publish_order_preserved() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");
        let mut sub = broker.subscribe(&topic).await.unwrap();

        broker.publish(&topic, update_for("1")).await;
        broker
            .publish(
                &topic,
                BroadcastMessage::content_update(
                    ScreenId::new("1"),
                    ContentPatch::url("b.png").apply_to(None),
                ),
            )
            .await;

        let first = sub.recv().await.unwrap();
        let second = sub.recv().await.unwrap();

        match (first, second) {
            (
                BroadcastMessage::ContentUpdate { content: a, .. },
                BroadcastMessage::ContentUpdate { content: b, .. },
            ) => {
                assert_eq!(a.url, "1.png");
                assert_eq!(b.url, "b.png");
            }
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_delivery_to_late_joiner() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        broker.publish(&topic, update_for("1")).await;

        // Subscribed after the publish: must not see the old message
        let mut sub = broker.subscribe(&topic).await.unwrap();
        let pending = tokio::time::timeout(std::time::Duration::from_millis(20), sub.recv()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        let mut sub = broker.subscribe(&topic).await.unwrap();
        sub.unsubscribe();
        sub.unsubscribe();

        let stats = broker.topic_stats(&topic).await.unwrap();
        assert_eq!(stats.subscriber_count, 0);

        // No delivery after unsubscribe
        broker.publish(&topic, update_for("1")).await;
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        let sub = broker.subscribe(&topic).await.unwrap();
        drop(sub);

        let stats = broker.topic_stats(&topic).await.unwrap();
        assert_eq!(stats.subscriber_count, 0);
    }

    #[tokio::test]
    async fn test_subscriber_limit() {
        let config = BrokerConfig::default().max_subscribers_per_topic(1);
        let broker = Broker::with_config(config);
        let topic = TopicName::new("screen_1");

        let _sub = broker.subscribe(&topic).await.unwrap();
        let result = broker.subscribe(&topic).await;

        assert!(matches!(result, Err(Error::SubscriberLimit(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_subscriber_limit_holds_under_concurrency() {
        let config = BrokerConfig::default().max_subscribers_per_topic(4);
        let broker = Arc::new(Broker::with_config(config));
        let topic = TopicName::new("screen_1");

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let broker = Arc::clone(&broker);
            let topic = topic.clone();
            tasks.push(tokio::spawn(async move { broker.subscribe(&topic).await.ok() }));
        }

        // Hold successful subscriptions so their slots stay claimed
        let mut held = Vec::new();
        let mut refused = 0;
        for task in tasks {
            match task.await.unwrap() {
                Some(sub) => held.push(sub),
                None => refused += 1,
            }
        }

        assert_eq!(held.len(), 4);
        assert_eq!(refused, 12);

        let stats = broker.topic_stats(&topic).await.unwrap();
        assert_eq!(stats.subscriber_count, 4);
    }

    #[tokio::test]
    async fn test_remove_topic() {
        let broker = Broker::new();
        let topic = TopicName::new("screen_1");

        let _sub = broker.subscribe(&topic).await.unwrap();
        assert_eq!(broker.topic_count().await, 1);

        broker.remove_topic(&topic).await;
        assert_eq!(broker.topic_count().await, 0);

        let content = Content::default();
        broker
            .publish(
                &topic,
                BroadcastMessage::content_update(ScreenId::new("1"), content),
            )
            .await;
        // Recreated on demand
        assert_eq!(broker.topic_count().await, 1);
    }
}
