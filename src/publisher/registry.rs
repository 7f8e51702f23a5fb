//! Screen registry state machine
//!
//! Pure in-memory registry of screens, selection, and slideshow settings.
//! All mutations are synchronous; persistence and broadcasting happen one
//! level up in [`super::PublisherSession`].

use crate::error::{Error, Result};
use crate::model::{Content, Screen, ScreenId, Session, MIN_SLIDESHOW_INTERVAL};

/// Authoritative registry of all screens in a session
///
/// Screen ids are kept dense (`"1".."N"`): removal and reset re-index the
/// remaining screens, preserving relative order. Any id cached across a
/// re-index is permanently invalid.
#[derive(Debug, Default)]
pub struct ScreenRegistry {
    screens: Vec<Screen>,
    selected: Option<ScreenId>,
    slideshow_enabled: bool,
    slideshow_interval_ms: u64,
}

impl ScreenRegistry {
    /// Create an empty registry with default slideshow settings
    pub fn new() -> Self {
        Self {
            screens: Vec::new(),
            selected: None,
            slideshow_enabled: false,
            slideshow_interval_ms: 5000,
        }
    }

    /// Build a registry from a loaded session
    pub fn from_session(session: Session) -> Self {
        let mut registry = Self::new();
        registry.load_session(session);
        registry
    }

    /// Append a new active screen with no content
    ///
    /// The id is assigned as `count + 1` post-append, name `"Screen {n}"`.
    pub fn add_screen(&mut self) -> ScreenId {
        let screen = Screen::at_index(self.screens.len());
        let id = screen.id.clone();
        self.screens.push(screen);
        id
    }

    /// Look up a screen by id
    pub fn screen(&self, id: &ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|s| &s.id == id)
    }

    /// All screens, in order
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Number of screens
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// Whether the registry has no screens
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Replace a screen's content wholesale
    ///
    /// Patch validation and merging happen one level up, in
    /// [`super::PublisherSession`], so the snapshot record can be written
    /// between the merge and this commit.
    pub fn set_content(&mut self, id: &ScreenId, content: Content) -> Result<()> {
        let screen = self
            .screens
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| Error::ScreenNotFound(id.clone()))?;

        screen.current_content = Some(content);
        Ok(())
    }

    /// Delete a screen and re-index the remainder
    ///
    /// Remaining screens keep their relative order and receive dense new
    /// ids `"1".."N"` with matching names. Clears the selection if it
    /// pointed at the removed screen.
    pub fn remove_screen(&mut self, id: &ScreenId) -> Result<()> {
        let index = self
            .screens
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| Error::ScreenNotFound(id.clone()))?;

        self.screens.remove(index);
        self.reindex();

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }

        Ok(())
    }

    /// Replace the entire screen collection
    ///
    /// Incoming screens are re-indexed to dense ids and the selection is
    /// cleared.
    pub fn reset(&mut self, screens: Vec<Screen>) {
        self.screens = screens;
        self.reindex();
        self.selected = None;
    }

    /// Select a screen
    pub fn select(&mut self, id: &ScreenId) -> Result<()> {
        if self.screen(id).is_none() {
            return Err(Error::ScreenNotFound(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// The currently selected screen, if any
    pub fn selected(&self) -> Option<&Screen> {
        self.selected.as_ref().and_then(|id| self.screen(id))
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Update slideshow settings (interval clamped to >= 1s)
    pub fn set_slideshow(&mut self, enabled: bool, interval: std::time::Duration) {
        self.slideshow_enabled = enabled;
        self.slideshow_interval_ms = (interval.as_millis() as u64)
            .max(MIN_SLIDESHOW_INTERVAL.as_millis() as u64);
    }

    /// Whether slideshow rotation is enabled
    pub fn slideshow_enabled(&self) -> bool {
        self.slideshow_enabled
    }

    /// Slideshow interval
    pub fn slideshow_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.slideshow_interval_ms)
    }

    /// Snapshot the registry as a saveable session
    pub fn session(&self) -> Session {
        Session {
            screens: self.screens.clone(),
            slideshow_enabled: self.slideshow_enabled,
            slideshow_interval_ms: self.slideshow_interval_ms,
        }
    }

    /// Replace registry state from a loaded session
    pub fn load_session(&mut self, session: Session) {
        self.reset(session.screens);
        self.slideshow_enabled = session.slideshow_enabled;
        self.slideshow_interval_ms = session
            .slideshow_interval_ms
            .max(MIN_SLIDESHOW_INTERVAL.as_millis() as u64);
    }

    fn reindex(&mut self) {
        for (index, screen) in self.screens.iter_mut().enumerate() {
            screen.reindex(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentPatch;

    fn registry_with(count: usize) -> ScreenRegistry {
        let mut registry = ScreenRegistry::new();
        for _ in 0..count {
            registry.add_screen();
        }
        registry
    }

    #[test]
    fn test_add_screen_ids_dense() {
        let mut registry = ScreenRegistry::new();

        assert_eq!(registry.add_screen(), ScreenId::new("1"));
        assert_eq!(registry.add_screen(), ScreenId::new("2"));
        assert_eq!(registry.add_screen(), ScreenId::new("3"));

        let screen = registry.screen(&ScreenId::new("2")).unwrap();
        assert_eq!(screen.name, "Screen 2");
        assert!(screen.is_active);
        assert!(screen.current_content.is_none());
    }

    #[test]
    fn test_remove_reindexes_densely() {
        let mut registry = registry_with(4);

        registry.remove_screen(&ScreenId::new("2")).unwrap();

        let ids: Vec<&str> = registry.screens().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let names: Vec<&str> = registry.screens().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Screen 1", "Screen 2", "Screen 3"]);
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let mut registry = registry_with(3);
        registry
            .set_content(&ScreenId::new("3"), ContentPatch::url("third.png").apply_to(None))
            .unwrap();

        registry.remove_screen(&ScreenId::new("2")).unwrap();

        // Old screen 3 becomes screen 2, content intact
        let screen = registry.screen(&ScreenId::new("2")).unwrap();
        assert_eq!(screen.name, "Screen 2");
        assert_eq!(screen.current_content.as_ref().unwrap().url, "third.png");
    }

    #[test]
    fn test_remove_unknown_screen() {
        let mut registry = registry_with(2);

        let result = registry.remove_screen(&ScreenId::new("9"));
        assert!(matches!(result, Err(Error::ScreenNotFound(_))));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_set_content_unknown_screen_leaves_registry_unchanged() {
        let mut registry = registry_with(2);

        let result = registry.set_content(
            &ScreenId::new("nonexistent"),
            ContentPatch::url("a.png").apply_to(None),
        );

        assert!(matches!(result, Err(Error::ScreenNotFound(_))));
        assert_eq!(registry.len(), 2);
        assert!(registry.screen(&ScreenId::new("1")).unwrap().current_content.is_none());
    }

    #[test]
    fn test_selection_cleared_on_remove() {
        let mut registry = registry_with(2);
        registry.select(&ScreenId::new("2")).unwrap();
        assert!(registry.selected().is_some());

        registry.remove_screen(&ScreenId::new("2")).unwrap();
        assert!(registry.selected().is_none());
    }

    #[test]
    fn test_reset_reindexes_and_clears_selection() {
        let mut registry = registry_with(1);
        registry.select(&ScreenId::new("1")).unwrap();

        let mut incoming = vec![Screen::at_index(4), Screen::at_index(7)];
        incoming[0].current_content =
            Some(ContentPatch::url("kept.png").apply_to(None));

        registry.reset(incoming);

        let ids: Vec<&str> = registry.screens().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(registry.selected().is_none());
        assert_eq!(
            registry
                .screen(&ScreenId::new("1"))
                .unwrap()
                .current_content
                .as_ref()
                .unwrap()
                .url,
            "kept.png"
        );
    }

    #[test]
    fn test_session_round_trip() {
        let mut registry = registry_with(2);
        registry.set_slideshow(true, std::time::Duration::from_millis(200));

        let session = registry.session();
        // Interval clamped to the minimum
        assert_eq!(session.slideshow_interval_ms, 1000);

        let restored = ScreenRegistry::from_session(session);
        assert_eq!(restored.len(), 2);
        assert!(restored.slideshow_enabled());
    }
}
