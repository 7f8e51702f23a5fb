//! Control-panel side of the sync protocol
//!
//! The publisher session owns the authoritative registry of screens and
//! their current content. Every content mutation persists a snapshot and
//! publishes a `content_update` before returning to the caller, so a
//! subscriber that requests content immediately after seeing an update is
//! never missing it.
//!
//! Responder tasks subscribe to each screen's topic and answer
//! `request_content` queries from late-joining displays.

pub mod registry;
pub mod session;

pub use registry::ScreenRegistry;
pub use session::PublisherSession;
