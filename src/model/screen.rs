//! Screens and screen identifiers
//!
//! A screen is a named display endpoint owned by the publisher session.
//! Subscribers only ever hold a read-only projection of one screen's
//! current content.

use serde::{Deserialize, Serialize};

use super::content::Content;

/// Opaque identifier for a screen
///
/// Ids are assigned densely (`"1".."N"`) and reassigned whenever the screen
/// collection is re-indexed (removal, reset). An id held across a re-index
/// is permanently invalid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(String);

impl ScreenId {
    /// Create an id from a raw string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for the screen at a zero-based position (ids are one-based)
    pub fn from_index(index: usize) -> Self {
        Self((index + 1).to_string())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScreenId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ScreenId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A display endpoint with mutable current content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    /// Dense identifier within the session
    pub id: ScreenId,

    /// Display name, kept consistent with the id (`"Screen {n}"`)
    pub name: String,

    /// Whether the screen participates in the session
    pub is_active: bool,

    /// Currently assigned content, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_content: Option<Content>,
}

impl Screen {
    /// Create a screen at a zero-based position with no content
    pub fn at_index(index: usize) -> Self {
        Self {
            id: ScreenId::from_index(index),
            name: format!("Screen {}", index + 1),
            is_active: true,
            current_content: None,
        }
    }

    /// Reassign this screen to a new zero-based position
    ///
    /// Updates both id and name; content and active flag are preserved.
    pub fn reindex(&mut self, index: usize) {
        self.id = ScreenId::from_index(index);
        self.name = format!("Screen {}", index + 1);
    }
}
