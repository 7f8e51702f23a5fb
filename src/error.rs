//! Crate error types
//!
//! Publisher-side errors (bad id, bad patch) are synchronous and reported
//! to the caller immediately. Subscriber-side connectivity problems are
//! never surfaced as errors; they only extend the awaiting-content state.

use crate::broker::TopicName;
use crate::model::ScreenId;

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sync operations
#[derive(Debug)]
pub enum Error {
    /// Mutation referenced a stale or removed screen id
    ///
    /// Re-indexing makes old ids permanently invalid; this is reported to
    /// the caller, not retried.
    ScreenNotFound(ScreenId),

    /// Content patch rejected before any registry mutation
    InvalidContentPatch(String),

    /// Topic refused a new subscriber (configured limit reached)
    ///
    /// Subscribers recover from this internally by retrying; it is never
    /// fatal on the display side.
    SubscriberLimit(TopicName),

    /// Named session does not exist in the session store
    SessionNotFound(String),

    /// Underlying storage I/O failure
    Io(std::io::Error),

    /// Snapshot or session (de)serialization failure
    Serialize(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ScreenNotFound(id) => write!(f, "Screen not found: {}", id),
            Error::InvalidContentPatch(reason) => {
                write!(f, "Invalid content patch: {}", reason)
            }
            Error::SubscriberLimit(topic) => {
                write!(f, "Subscriber limit reached on topic: {}", topic)
            }
            Error::SessionNotFound(name) => write!(f, "Session not found: {}", name),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e)
    }
}
