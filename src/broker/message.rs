//! Broadcast message types for topic routing
//!
//! This module defines the names that address topics and the JSON-shaped
//! messages that flow over them.

use serde::{Deserialize, Serialize};

use crate::model::{Content, ScreenId};

/// Addressable name of a broadcast topic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName(String);

impl TopicName {
    /// Create a topic name from a raw string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The topic associated with one screen (`"screen_{id}"`)
    pub fn for_screen(id: &ScreenId) -> Self {
        Self(format!("screen_{}", id))
    }

    /// The raw name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TopicName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message broadcast on a screen topic
///
/// Serialized shape: `{"event": "content_update", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum BroadcastMessage {
    /// Authoritative content for a screen
    ///
    /// Published by the publisher session, either unsolicited on mutation
    /// or in response to `request_content`.
    #[serde(rename_all = "camelCase")]
    ContentUpdate {
        /// Target screen
        screen_id: ScreenId,
        /// Full replacement content
        content: Content,
    },

    /// Query for the current content of a screen
    ///
    /// Published by a subscriber immediately after its subscription is
    /// acknowledged, and again on every retry tick while waiting.
    #[serde(rename_all = "camelCase")]
    RequestContent {
        /// Screen whose content is requested
        screen_id: ScreenId,
    },
}

impl BroadcastMessage {
    /// Create a content update message
    pub fn content_update(screen_id: ScreenId, content: Content) -> Self {
        Self::ContentUpdate { screen_id, content }
    }

    /// Create a content request message
    pub fn request_content(screen_id: ScreenId) -> Self {
        Self::RequestContent { screen_id }
    }

    /// The screen this message concerns
    pub fn screen_id(&self) -> &ScreenId {
        match self {
            Self::ContentUpdate { screen_id, .. } => screen_id,
            Self::RequestContent { screen_id } => screen_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_for_screen() {
        let topic = TopicName::for_screen(&ScreenId::new("3"));

        assert_eq!(topic.as_str(), "screen_3");
    }

    #[test]
    fn test_content_update_wire_format() {
        let msg = BroadcastMessage::content_update(ScreenId::new("1"), Content::default());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["event"], "content_update");
        assert_eq!(json["payload"]["screenId"], "1");
        assert_eq!(json["payload"]["content"]["type"], "image");
    }

    #[test]
    fn test_request_content_wire_format() {
        let msg = BroadcastMessage::request_content(ScreenId::new("2"));
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["event"], "request_content");
        assert_eq!(json["payload"]["screenId"], "2");
    }

    #[test]
    fn test_message_round_trip() {
        let msg = BroadcastMessage::content_update(ScreenId::new("1"), Content::default());
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: BroadcastMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(msg, parsed);
    }
}
