//! Pub/sub broker for screen content routing
//!
//! The broker manages one addressable topic per screen and routes published
//! messages to all current subscribers of the matching topic. It uses
//! `tokio::sync::broadcast` for efficient fan-out to multiple subscribers.
//!
//! # Architecture
//!
//! ```text
//!                            Arc<Broker>
//!                     ┌─────────────────────────┐
//!                     │ topics: HashMap<        │
//!                     │   TopicName,            │
//!                     │   Topic {               │
//!                     │     tx: broadcast::Tx,  │
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!   [PublisherSession]     [SubscriberClient]      [SubscriberClient]
//!   publish()              subscription.recv()     subscription.recv()
//! ```
//!
//! # Delivery semantics
//!
//! Best-effort, at-most-once per currently-registered subscriber. Messages
//! are delivered in publish order per topic and are never queued for late
//! joiners; the `request_content` recovery handshake exists precisely
//! because of that. A topic with zero subscribers is a no-op sink.

pub mod config;
pub mod message;
pub mod store;
pub mod topic;

pub use config::BrokerConfig;
pub use message::{BroadcastMessage, TopicName};
pub use store::Broker;
pub use topic::{Subscription, Topic, TopicStats};
