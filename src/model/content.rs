//! Content payloads and patches
//!
//! `Content` is the visual payload shown on a screen: a media URL plus
//! transform parameters. It is an immutable value; updates across the wire
//! always replace the whole value. `ContentPatch` supports partial-field
//! updates on the publisher side before the merged value is published.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Kind of media shown on a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Still image
    Image,
    /// Video (looped on the display)
    Video,
}

/// Visual payload for a single screen
///
/// Serialized shape matches the broadcast wire format:
/// `{"type": "image", "url": ..., "title": ..., "rotation": ...,
///   "scale": ..., "backgroundColor": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Media kind
    #[serde(rename = "type")]
    pub kind: ContentKind,

    /// Media URL
    pub url: String,

    /// Human-readable title
    pub title: String,

    /// Rotation in degrees
    pub rotation: f64,

    /// Scale factor (must be > 0)
    pub scale: f64,

    /// Background color behind the media (CSS color string)
    pub background_color: String,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            kind: ContentKind::Image,
            url: String::new(),
            title: String::new(),
            rotation: 0.0,
            scale: 1.0,
            background_color: "#000000".to_string(),
        }
    }
}

impl Content {
    /// Build content from a dropped media item, with default transform
    pub fn from_media(item: &MediaItem) -> Self {
        Self {
            kind: item.kind,
            url: item.url.clone(),
            title: item.title.clone(),
            ..Default::default()
        }
    }
}

/// Partial update to a screen's content
///
/// Absent fields keep their current value (or the documented default when
/// the screen has no content yet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    /// New media kind
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,

    /// New media URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New rotation in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,

    /// New scale factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    /// New background color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl ContentPatch {
    /// Validate the patch fields
    ///
    /// Rejects non-finite transforms, non-positive scale, and an empty URL.
    /// Validation happens before any registry mutation, so a bad patch
    /// leaves state untouched.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(rotation) = self.rotation {
            if !rotation.is_finite() {
                return Err(Error::InvalidContentPatch(format!(
                    "rotation must be finite, got {rotation}"
                )));
            }
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(Error::InvalidContentPatch(format!(
                    "scale must be a finite value > 0, got {scale}"
                )));
            }
        }
        if let Some(ref url) = self.url {
            if url.is_empty() {
                return Err(Error::InvalidContentPatch(
                    "url must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Merge this patch into existing content
    ///
    /// Starts from `current` if the screen already has content, otherwise
    /// from `Content::default()`.
    pub fn apply_to(&self, current: Option<&Content>) -> Content {
        let mut content = current.cloned().unwrap_or_default();

        if let Some(kind) = self.kind {
            content.kind = kind;
        }
        if let Some(ref url) = self.url {
            content.url = url.clone();
        }
        if let Some(ref title) = self.title {
            content.title = title.clone();
        }
        if let Some(rotation) = self.rotation {
            content.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            content.scale = scale;
        }
        if let Some(ref color) = self.background_color {
            content.background_color = color.clone();
        }

        content
    }

    /// Patch that only changes the URL
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// Record from an external media library
///
/// Only the fields the sync core needs; upload, listing, and generation of
/// media items are external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Library-assigned identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Media kind
    #[serde(rename = "type")]
    pub kind: ContentKind,

    /// Resolvable media URL
    pub url: String,
}

impl MediaItem {
    /// Create a new media item
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: ContentKind,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_defaults() {
        let content = Content::default();

        assert_eq!(content.kind, ContentKind::Image);
        assert_eq!(content.rotation, 0.0);
        assert_eq!(content.scale, 1.0);
        assert_eq!(content.background_color, "#000000");
    }

    #[test]
    fn test_patch_on_empty_uses_defaults() {
        let patch = ContentPatch::url("a.png");
        let content = patch.apply_to(None);

        assert_eq!(content.url, "a.png");
        assert_eq!(content.kind, ContentKind::Image);
        assert_eq!(content.scale, 1.0);
        assert_eq!(content.background_color, "#000000");
    }

    #[test]
    fn test_patch_preserves_unset_fields() {
        let base = Content {
            kind: ContentKind::Video,
            url: "v.mp4".into(),
            title: "clip".into(),
            rotation: 90.0,
            scale: 2.0,
            background_color: "#ffffff".into(),
        };

        let patch = ContentPatch {
            rotation: Some(180.0),
            ..Default::default()
        };
        let merged = patch.apply_to(Some(&base));

        assert_eq!(merged.rotation, 180.0);
        assert_eq!(merged.url, "v.mp4");
        assert_eq!(merged.scale, 2.0);
        assert_eq!(merged.kind, ContentKind::Video);
    }

    #[test]
    fn test_patch_is_idempotent() {
        let patch = ContentPatch {
            url: Some("a.png".into()),
            rotation: Some(45.0),
            ..Default::default()
        };

        let once = patch.apply_to(None);
        let twice = patch.apply_to(Some(&once));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let patch = ContentPatch {
            scale: Some(0.0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ContentPatch {
            scale: Some(f64::NAN),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let patch = ContentPatch {
            url: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_content_wire_format() {
        let content = Content {
            kind: ContentKind::Video,
            url: "v.mp4".into(),
            title: "clip".into(),
            rotation: 0.0,
            scale: 1.0,
            background_color: "#000000".into(),
        };

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["backgroundColor"], "#000000");
        assert_eq!(json["url"], "v.mp4");
    }

    #[test]
    fn test_from_media() {
        let item = MediaItem::new("m1", "Sunset", ContentKind::Image, "sunset.png");
        let content = Content::from_media(&item);

        assert_eq!(content.url, "sunset.png");
        assert_eq!(content.title, "Sunset");
        assert_eq!(content.scale, 1.0);
    }
}
