//! Publisher session
//!
//! Orchestrates the screen registry, snapshot persistence, and topic
//! broadcasting. Registry mutations are serialized behind a single mutex
//! (single-writer discipline): re-indexing and content patching both
//! read-modify-write the registry, so concurrent mutations on the same
//! session must be mutually exclusive.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::broker::{BroadcastMessage, Broker, TopicName};
use crate::error::{Error, Result};
use crate::model::{Content, ContentPatch, MediaItem, Screen, ScreenId, Session};
use crate::snapshot::ContentSnapshotStore;

use super::registry::ScreenRegistry;

/// Control-panel session owning the authoritative screen registry
///
/// On every content mutation the snapshot record is written and the
/// `content_update` is published before control returns to the caller.
/// A per-screen responder task answers `request_content` queries from
/// late-joining displays.
pub struct PublisherSession {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Mutex<ScreenRegistry>,
    broker: Arc<Broker>,
    snapshots: Arc<ContentSnapshotStore>,
    responders: Mutex<HashMap<ScreenId, JoinHandle<()>>>,
}

impl PublisherSession {
    /// Create a session with an empty registry
    pub fn new(broker: Arc<Broker>, snapshots: Arc<ContentSnapshotStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(ScreenRegistry::new()),
                broker,
                snapshots,
                responders: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Append a new active screen with no content
    ///
    /// Nothing is broadcast; the screen has no content yet.
    pub async fn add_screen(&self) -> ScreenId {
        let id = {
            let mut registry = self.inner.registry.lock().await;
            registry.add_screen()
        };

        self.inner
            .responders
            .lock()
            .await
            .insert(id.clone(), spawn_responder(&self.inner, id.clone()));

        tracing::info!(screen = %id, "Screen added");
        id
    }

    /// Merge a patch into a screen's content and push the result
    ///
    /// Validates the patch, writes the snapshot record, commits the merged
    /// content to the registry, and publishes `content_update` -- in that
    /// order, all before returning. On any error the registry is left
    /// unchanged.
    pub async fn update_screen_content(
        &self,
        id: &ScreenId,
        patch: &ContentPatch,
    ) -> Result<Content> {
        let mut registry = self.inner.registry.lock().await;

        patch.validate()?;
        let screen = registry
            .screen(id)
            .ok_or_else(|| Error::ScreenNotFound(id.clone()))?;
        let merged = patch.apply_to(screen.current_content.as_ref());

        self.inner.snapshots.put(id, merged.clone()).await?;
        registry.set_content(id, merged.clone())?;

        self.inner
            .broker
            .publish(
                &TopicName::for_screen(id),
                BroadcastMessage::content_update(id.clone(), merged.clone()),
            )
            .await;

        tracing::info!(screen = %id, url = %merged.url, "Content updated");
        Ok(merged)
    }

    /// Replace a screen's content wholesale with a dropped media item
    ///
    /// Unlike [`update_screen_content`](Self::update_screen_content) this
    /// does not merge: the new content starts from default transform
    /// parameters.
    pub async fn drop_media(&self, item: &MediaItem, id: &ScreenId) -> Result<Content> {
        let mut registry = self.inner.registry.lock().await;

        if registry.screen(id).is_none() {
            return Err(Error::ScreenNotFound(id.clone()));
        }
        let content = Content::from_media(item);

        self.inner.snapshots.put(id, content.clone()).await?;
        registry.set_content(id, content.clone())?;

        self.inner
            .broker
            .publish(
                &TopicName::for_screen(id),
                BroadcastMessage::content_update(id.clone(), content.clone()),
            )
            .await;

        tracing::info!(screen = %id, media = %item.id, "Media dropped");
        Ok(content)
    }

    /// Delete a screen and re-index the remainder to dense ids
    ///
    /// Any screen id cached by a caller or display becomes invalid across
    /// this call; displays key off their route, not a cached id, and
    /// recover through the request/response handshake.
    pub async fn remove_screen(&self, id: &ScreenId) -> Result<()> {
        let mut registry = self.inner.registry.lock().await;

        let prev_ids: Vec<ScreenId> = registry.screens().iter().map(|s| s.id.clone()).collect();
        registry.remove_screen(id)?;

        self.resync_after_reindex(&registry, &prev_ids).await;

        tracing::info!(screen = %id, remaining = registry.len(), "Screen removed");
        Ok(())
    }

    /// Replace the entire screen collection
    ///
    /// Incoming screens are re-indexed to dense ids and the selection is
    /// cleared.
    pub async fn reset_screens(&self, screens: Vec<Screen>) {
        let mut registry = self.inner.registry.lock().await;

        let prev_ids: Vec<ScreenId> = registry.screens().iter().map(|s| s.id.clone()).collect();
        registry.reset(screens);

        self.resync_after_reindex(&registry, &prev_ids).await;

        tracing::info!(screens = registry.len(), "Screens reset");
    }

    /// Answer a content query for a screen
    ///
    /// Re-publishes `content_update` with the current registry value, or
    /// publishes nothing if the screen has no content yet (the subscriber
    /// keeps polling).
    pub async fn handle_request_content(&self, id: &ScreenId) {
        self.inner.answer_request(id).await;
    }

    /// Select a screen on the control panel
    pub async fn select_screen(&self, id: &ScreenId) -> Result<()> {
        self.inner.registry.lock().await.select(id)
    }

    /// The currently selected screen, if any
    pub async fn selected_screen(&self) -> Option<Screen> {
        self.inner.registry.lock().await.selected().cloned()
    }

    /// Update slideshow settings (interval clamped to >= 1s)
    pub async fn set_slideshow(&self, enabled: bool, interval: Duration) {
        self.inner.registry.lock().await.set_slideshow(enabled, interval);
    }

    /// Whether slideshow rotation is enabled
    pub async fn slideshow_enabled(&self) -> bool {
        self.inner.registry.lock().await.slideshow_enabled()
    }

    /// Slideshow interval
    pub async fn slideshow_interval(&self) -> Duration {
        self.inner.registry.lock().await.slideshow_interval()
    }

    /// Snapshot the registry as a saveable session
    pub async fn session(&self) -> Session {
        self.inner.registry.lock().await.session()
    }

    /// Replace all session state from a loaded session
    pub async fn load_session(&self, session: Session) {
        let mut registry = self.inner.registry.lock().await;

        let prev_ids: Vec<ScreenId> = registry.screens().iter().map(|s| s.id.clone()).collect();
        registry.load_session(session);

        self.resync_after_reindex(&registry, &prev_ids).await;

        tracing::info!(screens = registry.len(), "Session loaded");
    }

    /// All screens, in order
    pub async fn screens(&self) -> Vec<Screen> {
        self.inner.registry.lock().await.screens().to_vec()
    }

    /// Look up a screen by id
    pub async fn screen(&self, id: &ScreenId) -> Option<Screen> {
        self.inner.registry.lock().await.screen(id).cloned()
    }

    /// Number of screens
    pub async fn screen_count(&self) -> usize {
        self.inner.registry.lock().await.len()
    }

    /// Tear down the session
    ///
    /// Aborts all responder tasks and removes the topics this session
    /// created, so no subscriptions are left dangling.
    pub async fn shutdown(&self) {
        // Lock order matches the mutation paths: registry, then responders
        let registry = self.inner.registry.lock().await;
        let mut responders = self.inner.responders.lock().await;
        for (_, handle) in responders.drain() {
            handle.abort();
        }

        for screen in registry.screens() {
            self.inner
                .broker
                .remove_topic(&TopicName::for_screen(&screen.id))
                .await;
        }

        tracing::info!("Publisher session shut down");
    }

    /// Re-sync responder tasks, topics, and snapshots after a re-index
    ///
    /// Responders are rebuilt for the current screen set and stale topics
    /// removed first; only then are snapshot records rewritten under the
    /// new dense ids. The registry is already committed when this runs, so
    /// a failed snapshot write must not leave the responder set stale: it
    /// is logged and skipped, and displays recover the correct state
    /// through the request/response handshake. Called with the registry
    /// lock held so no other mutation can interleave.
    async fn resync_after_reindex(&self, registry: &ScreenRegistry, prev_ids: &[ScreenId]) {
        let current: Vec<ScreenId> = registry.screens().iter().map(|s| s.id.clone()).collect();

        {
            let mut responders = self.inner.responders.lock().await;
            for (_, handle) in responders.drain() {
                handle.abort();
            }
            for id in current.iter().cloned() {
                responders.insert(id.clone(), spawn_responder(&self.inner, id));
            }
        }

        for prev in prev_ids {
            if !current.contains(prev) {
                self.inner
                    .broker
                    .remove_topic(&TopicName::for_screen(prev))
                    .await;
            }
        }

        for prev in prev_ids {
            if let Err(e) = self.inner.snapshots.remove(prev).await {
                tracing::warn!(screen = %prev, error = %e, "Failed to drop stale snapshot record");
            }
        }
        for screen in registry.screens() {
            if let Some(ref content) = screen.current_content {
                if let Err(e) = self.inner.snapshots.put(&screen.id, content.clone()).await {
                    tracing::warn!(screen = %screen.id, error = %e, "Failed to rewrite snapshot record");
                }
            }
        }
    }
}

impl Inner {
    /// Answer a content query with the current registry value
    ///
    /// Publishes nothing if the screen has no content yet; the display
    /// keeps polling.
    async fn answer_request(&self, id: &ScreenId) {
        let content = {
            let registry = self.registry.lock().await;
            registry.screen(id).and_then(|s| s.current_content.clone())
        };

        if let Some(content) = content {
            tracing::debug!(screen = %id, "Answering content request");
            self.broker
                .publish(
                    &TopicName::for_screen(id),
                    BroadcastMessage::content_update(id.clone(), content),
                )
                .await;
        }
    }
}

impl Drop for PublisherSession {
    fn drop(&mut self) {
        // Responder tasks hold the inner Arc; abort them so a session
        // dropped without shutdown() does not leak its tasks
        if let Ok(mut responders) = self.inner.responders.try_lock() {
            for (_, handle) in responders.drain() {
                handle.abort();
            }
        }
    }
}

/// Spawn the responder task for one screen's topic
///
/// The responder answers `request_content` queries with the current
/// registry value; its own `content_update` broadcasts come back over the
/// same topic and are ignored.
fn spawn_responder(inner: &Arc<Inner>, screen_id: ScreenId) -> JoinHandle<()> {
    let inner = Arc::clone(inner);

    tokio::spawn(async move {
        let topic = TopicName::for_screen(&screen_id);

        let mut sub = loop {
            match inner.broker.subscribe(&topic).await {
                Ok(sub) => break sub,
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Responder subscribe failed, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        };

        while let Some(message) = sub.recv().await {
            let BroadcastMessage::RequestContent { screen_id: requested } = message else {
                continue;
            };
            if requested != screen_id {
                continue;
            }

            inner.answer_request(&screen_id).await;
        }
    })
}
