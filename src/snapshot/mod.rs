//! Snapshot persistence
//!
//! Two stores back the sync protocol:
//!
//! - [`ContentSnapshotStore`] keeps the last-known content per screen. It is
//!   a cold-start cache for displays, never authoritative once a live
//!   subscription is established; last-write-wins by design.
//! - [`SessionStore`] saves and loads whole named sessions (screen list plus
//!   slideshow settings).
//!
//! Both come in an in-memory flavor for tests and embedding, and a
//! file-backed flavor (one JSON file per record) that survives process
//! restart.

pub mod content_store;
pub mod session_store;

pub use content_store::{ContentSnapshotStore, SnapshotRecord};
pub use session_store::SessionStore;
