//! Subscriber client state machine
//!
//! Per-screen display driver. Runs as an independent task that talks to the
//! publisher only through the broker and the shared snapshot store; the two
//! sides share no mutable state and may live in different processes in a
//! networked deployment.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::broker::{BroadcastMessage, Broker, TopicName};
use crate::model::{Content, ScreenId};
use crate::snapshot::ContentSnapshotStore;

use super::config::SubscriberConfig;

/// Display lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPhase {
    /// Loading the last snapshot, not yet subscribed
    ColdStart,
    /// Establishing the topic subscription
    Subscribing,
    /// Subscribed, waiting for authoritative content
    AwaitingContent,
    /// Showing authoritative content; only ever replaced, never cleared
    Displaying,
}

/// Events emitted to the client's owner
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// Topic subscription established
    Subscribed,

    /// The content to show changed (snapshot or live update)
    ContentChanged(Content),
}

/// Display-side client for one screen
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use screensync::broker::Broker;
/// use screensync::model::ScreenId;
/// use screensync::snapshot::ContentSnapshotStore;
/// use screensync::subscriber::{SubscriberClient, SubscriberConfig};
///
/// # async fn example() {
/// let broker = Arc::new(Broker::new());
/// let snapshots = Arc::new(ContentSnapshotStore::in_memory());
///
/// let (client, mut events) = SubscriberClient::new(
///     broker,
///     snapshots,
///     ScreenId::new("1"),
///     SubscriberConfig::default(),
/// );
///
/// while let Some(event) = events.recv().await {
///     println!("Event: {:?}", event);
/// }
/// # client.shutdown();
/// # }
/// ```
pub struct SubscriberClient {
    screen_id: ScreenId,
    task: JoinHandle<()>,
    phase_rx: watch::Receiver<DisplayPhase>,
    content_rx: watch::Receiver<Option<Content>>,
}

impl SubscriberClient {
    /// Create a client and start its driver task
    ///
    /// Returns the client and a receiver for display events.
    pub fn new(
        broker: Arc<Broker>,
        snapshots: Arc<ContentSnapshotStore>,
        screen_id: ScreenId,
        config: SubscriberConfig,
    ) -> (Self, mpsc::Receiver<DisplayEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (phase_tx, phase_rx) = watch::channel(DisplayPhase::ColdStart);
        let (content_tx, content_rx) = watch::channel(None);

        let driver = Driver {
            broker,
            snapshots,
            screen_id: screen_id.clone(),
            config,
            phase_tx,
            content_tx,
            event_tx,
        };
        let task = tokio::spawn(driver.run());

        let client = Self {
            screen_id,
            task,
            phase_rx,
            content_rx,
        };

        (client, event_rx)
    }

    /// The screen this client displays
    pub fn screen_id(&self) -> &ScreenId {
        &self.screen_id
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> DisplayPhase {
        *self.phase_rx.borrow()
    }

    /// Watch handle for phase transitions
    pub fn phase_watch(&self) -> watch::Receiver<DisplayPhase> {
        self.phase_rx.clone()
    }

    /// Content currently shown, if any
    pub fn current_content(&self) -> Option<Content> {
        self.content_rx.borrow().clone()
    }

    /// Watch handle for content changes
    pub fn content_watch(&self) -> watch::Receiver<Option<Content>> {
        self.content_rx.clone()
    }

    /// Tear the client down
    ///
    /// Safe from any phase, including before the subscription completes.
    /// Cancels the driver task, which drops the subscription (stopping
    /// future deliveries) and any pending retry timer.
    pub fn shutdown(self) {
        self.task.abort();
        tracing::info!(screen = %self.screen_id, "Subscriber client shut down");
    }
}

impl Drop for SubscriberClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// State owned by the spawned driver task
struct Driver {
    broker: Arc<Broker>,
    snapshots: Arc<ContentSnapshotStore>,
    screen_id: ScreenId,
    config: SubscriberConfig,
    phase_tx: watch::Sender<DisplayPhase>,
    content_tx: watch::Sender<Option<Content>>,
    event_tx: mpsc::Sender<DisplayEvent>,
}

impl Driver {
    async fn run(self) {
        let topic = TopicName::for_screen(&self.screen_id);

        // ColdStart: optimistic render from the snapshot store. The value
        // may be stale (screen removed and re-indexed); the live handshake
        // below silently supersedes it.
        if let Some(content) = self.snapshots.get(&self.screen_id).await {
            tracing::debug!(screen = %self.screen_id, "Rendering snapshot on cold start");
            self.show(content, false).await;
        }

        // Subscribing: a refused subscription is never fatal, just a longer
        // stay in this phase.
        let _ = self.phase_tx.send(DisplayPhase::Subscribing);
        let mut sub = loop {
            match self.broker.subscribe(&topic).await {
                Ok(sub) => break sub,
                Err(e) => {
                    tracing::warn!(
                        screen = %self.screen_id,
                        error = %e,
                        "Subscribe failed, retrying"
                    );
                    tokio::time::sleep(self.config.subscribe_backoff).await;
                }
            }
        };

        // Subscribed: now (and only now) ask the publisher for the
        // authoritative content.
        let _ = self.phase_tx.send(DisplayPhase::AwaitingContent);
        let _ = self.event_tx.send(DisplayEvent::Subscribed).await;
        self.broker
            .publish(
                &topic,
                BroadcastMessage::request_content(self.screen_id.clone()),
            )
            .await;

        let mut poll = tokio::time::interval(self.config.retry_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.tick().await; // immediate first tick

        loop {
            let awaiting = *self.phase_tx.borrow() != DisplayPhase::Displaying;

            tokio::select! {
                message = sub.recv() => match message {
                    Some(BroadcastMessage::ContentUpdate { screen_id, content })
                        if screen_id == self.screen_id =>
                    {
                        // Unconditional last-write-wins: a fresher update
                        // always replaces what is shown.
                        self.show(content, true).await;
                        let _ = self.phase_tx.send(DisplayPhase::Displaying);
                    }
                    Some(_) => {} // other screens' requests, or our own
                    None => {
                        tracing::debug!(screen = %self.screen_id, "Topic closed");
                        break;
                    }
                },
                _ = poll.tick(), if awaiting => {
                    // The publisher may have joined the topic after us and
                    // missed the first request; no re-ordering or buffering
                    // is assumed, so ask again and re-check the snapshot.
                    if let Some(content) = self.snapshots.get(&self.screen_id).await {
                        self.show(content, false).await;
                    }
                    self.broker
                        .publish(
                            &topic,
                            BroadcastMessage::request_content(self.screen_id.clone()),
                        )
                        .await;
                }
            }
        }
    }

    /// Update the shown content and notify the owner
    ///
    /// Snapshot-sourced applies (`authoritative == false`) skip the event
    /// when the value is unchanged, so the retry poll does not spam the
    /// owner.
    async fn show(&self, content: Content, authoritative: bool) {
        if !authoritative && self.content_tx.borrow().as_ref() == Some(&content) {
            return;
        }

        let _ = self.content_tx.send(Some(content.clone()));
        let _ = self
            .event_tx
            .send(DisplayEvent::ContentChanged(content))
            .await;
    }
}
