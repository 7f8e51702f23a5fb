//! # screensync
//!
//! Realtime content synchronization between a control panel and a variable
//! number of display endpoints ("screens").
//!
//! The core is a small pub/sub protocol: one broadcast topic per screen, a
//! durable snapshot fallback for cold starts, and a
//! `request_content`/`content_update` handshake that lets a late-joining
//! display recover the correct state regardless of how connect, publish,
//! and disconnect events interleave.
//!
//! ```text
//! operator action
//!       │
//!       ▼
//! PublisherSession ──► ContentSnapshotStore (persist)
//!       │
//!       └──► Broker.publish(content_update) ──► SubscriberClient(s)
//!                                                     │
//!              request_content  ◄─────────────────────┘ (on join)
//! ```
//!
//! Delivery is deliberately best-effort and eventually consistent,
//! optimized for tens of screens and human-scale update latency.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use screensync::broker::Broker;
//! use screensync::model::ContentPatch;
//! use screensync::publisher::PublisherSession;
//! use screensync::snapshot::ContentSnapshotStore;
//! use screensync::subscriber::{SubscriberClient, SubscriberConfig};
//!
//! # async fn example() -> screensync::error::Result<()> {
//! let broker = Arc::new(Broker::new());
//! let snapshots = Arc::new(ContentSnapshotStore::open("./snapshots").await?);
//!
//! let session = PublisherSession::new(Arc::clone(&broker), Arc::clone(&snapshots));
//! let screen = session.add_screen().await;
//!
//! let (display, mut events) = SubscriberClient::new(
//!     Arc::clone(&broker),
//!     Arc::clone(&snapshots),
//!     screen.clone(),
//!     SubscriberConfig::default(),
//! );
//!
//! session
//!     .update_screen_content(&screen, &ContentPatch::url("sunset.png"))
//!     .await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("display event: {:?}", event);
//! }
//! # display.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod error;
pub mod model;
pub mod publisher;
pub mod snapshot;
pub mod subscriber;

pub use broker::{BroadcastMessage, Broker, BrokerConfig, TopicName};
pub use error::{Error, Result};
pub use model::{Content, ContentKind, ContentPatch, MediaItem, Screen, ScreenId, Session};
pub use publisher::PublisherSession;
pub use snapshot::{ContentSnapshotStore, SessionStore};
pub use subscriber::{DisplayEvent, DisplayPhase, SubscriberClient, SubscriberConfig};
