//! Sessions
//!
//! A session is the unit of save/load: the ordered screen collection plus
//! slideshow settings. Persistence of named sessions lives in
//! [`crate::snapshot::SessionStore`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::screen::Screen;

/// Minimum slideshow interval
pub const MIN_SLIDESHOW_INTERVAL: Duration = Duration::from_secs(1);

/// A saved/loadable collection of screens plus slideshow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Ordered screen collection
    pub screens: Vec<Screen>,

    /// Whether slideshow rotation is enabled
    pub slideshow_enabled: bool,

    /// Slideshow interval in milliseconds (>= 1000)
    #[serde(rename = "slideshowInterval")]
    pub slideshow_interval_ms: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            screens: Vec::new(),
            slideshow_enabled: false,
            slideshow_interval_ms: 5000,
        }
    }
}

impl Session {
    /// Slideshow interval as a duration
    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow_interval_ms)
    }

    /// Set the slideshow interval, clamped to [`MIN_SLIDESHOW_INTERVAL`]
    pub fn set_slideshow_interval(&mut self, interval: Duration) {
        let ms = interval.as_millis() as u64;
        self.slideshow_interval_ms = ms.max(MIN_SLIDESHOW_INTERVAL.as_millis() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_clamped() {
        let mut session = Session::default();

        session.set_slideshow_interval(Duration::from_millis(200));
        assert_eq!(session.slideshow_interval_ms, 1000);

        session.set_slideshow_interval(Duration::from_secs(10));
        assert_eq!(session.slideshow_interval_ms, 10_000);
    }

    #[test]
    fn test_session_round_trip() {
        let session = Session {
            screens: vec![Screen::at_index(0), Screen::at_index(1)],
            slideshow_enabled: true,
            slideshow_interval_ms: 3000,
        };

        let json = serde_json::to_string(&session).unwrap();
        let loaded: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(session, loaded);
    }
}
