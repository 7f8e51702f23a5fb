//! Core data model
//!
//! Value types shared between the publisher and subscriber sides:
//! screens, content payloads, content patches, and sessions.

pub mod content;
pub mod screen;
pub mod session;

pub use content::{Content, ContentKind, ContentPatch, MediaItem};
pub use screen::{Screen, ScreenId};
pub use session::{Session, MIN_SLIDESHOW_INTERVAL};
