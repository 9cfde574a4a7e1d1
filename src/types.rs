//! Core type definitions for compile-time safety.
//!
//! Newtype wrappers keep media, presentation and theme identifiers from being
//! mixed up, and the closed vocabularies of the data files (media categories,
//! slide types, theme contexts...) are plain enums so an unknown value fails
//! deserialization instead of slipping through.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Current local time, the timestamp format stored in every record.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random (v4 UUID) identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Media item identifier.
    MediaId
);

string_id!(
    /// Presentation identifier.
    PresentationId
);

string_id!(
    /// Theme identifier.
    ThemeId
);

fn parse_variant<T: Copy>(module: &'static str, all: &[T], name: fn(T) -> &'static str, s: &str) -> Result<T, Error> {
    all.iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| {
            let choices: Vec<&str> = all.iter().map(|v| name(*v)).collect();
            Error::model(module, "PARSE_001", format!("unknown value '{s}', expected one of {}", choices.join(", ")))
        })
}

/// Media library category. Each category has its own sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaCategory {
    /// Still images.
    Images,
    /// Video clips.
    Videos,
    /// Animated GIFs.
    Gifs,
}

impl MediaCategory {
    /// Returns all categories in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Images, Self::Videos, Self::Gifs]
    }

    /// Human-readable name, also the on-disk directory name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Gifs => "Gifs",
        }
    }

    /// Supported lowercase file extensions (with leading dot).
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Images => &[".jpg", ".jpeg", ".png", ".bmp"],
            Self::Videos => &[".mp4", ".mov", ".avi"],
            Self::Gifs => &[".gif"],
        }
    }

    /// Category owning a file extension (with or without leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.extensions().iter().any(|e| e[1..] == ext))
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MediaCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("Media", Self::all(), Self::name, s)
    }
}

/// How a media item is scaled to the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    /// Stretch to fill, ignoring aspect ratio.
    Stretch,
    /// Fit inside, keeping aspect ratio.
    #[default]
    Fit,
    /// Fill and crop, keeping aspect ratio.
    Fill,
}

impl Scaling {
    /// Returns all scaling modes.
    pub const fn all() -> &'static [Self] {
        &[Self::Stretch, Self::Fit, Self::Fill]
    }

    /// Name as stored on disk.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stretch => "stretch",
            Self::Fit => "fit",
            Self::Fill => "fill",
        }
    }
}

impl FromStr for Scaling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("Media", Self::all(), Self::name, s)
    }
}

/// Kind of a presentation slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlideType {
    /// Plain text slide.
    #[default]
    Text,
    /// Image from the media directory.
    Image,
    /// Video from the media directory.
    Video,
}

impl SlideType {
    /// Returns all slide types.
    pub const fn all() -> &'static [Self] {
        &[Self::Text, Self::Image, Self::Video]
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Video => "Video",
        }
    }

    /// Whether the slide content is a path into the media directory.
    pub const fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

impl FromStr for SlideType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("Presentations", Self::all(), Self::name, s)
    }
}

/// Content a theme is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeContext {
    /// Song lyrics.
    Songs,
    /// Bible passages.
    Scriptures,
    /// Presentation slides.
    Presentations,
}

impl ThemeContext {
    /// Returns all contexts.
    pub const fn all() -> &'static [Self] {
        &[Self::Songs, Self::Scriptures, Self::Presentations]
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Songs => "Songs",
            Self::Scriptures => "Scriptures",
            Self::Presentations => "Presentations",
        }
    }
}

impl FromStr for ThemeContext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("Themes", Self::all(), Self::name, s)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Centered,
    /// Flush right.
    Right,
}

impl Alignment {
    /// Returns all alignments.
    pub const fn all() -> &'static [Self] {
        &[Self::Left, Self::Centered, Self::Right]
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Centered => "Centered",
            Self::Right => "Right",
        }
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "center" => Ok(Self::Centered),
            _ => parse_variant("Themes", Self::all(), Self::name, s),
        }
    }
}

/// Kind of item that can be scheduled or sent to a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A song, identified by title.
    Song,
    /// A media item, identified by id.
    Media,
    /// A presentation, identified by id.
    Presentation,
    /// A scripture passage, identified by `bible_id:reference`.
    Scripture,
}

impl ContentKind {
    /// Returns all kinds.
    pub const fn all() -> &'static [Self] {
        &[Self::Song, Self::Media, Self::Presentation, Self::Scripture]
    }

    /// Name as stored in schedule files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Song => "song",
            Self::Media => "media",
            Self::Presentation => "presentation",
            Self::Scripture => "scripture",
        }
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("Schedule", Self::all(), Self::name, s)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_media_category_from_extension() {
        assert_eq!(MediaCategory::from_extension(".PNG"), Some(MediaCategory::Images));
        assert_eq!(MediaCategory::from_extension("mov"), Some(MediaCategory::Videos));
        assert_eq!(MediaCategory::from_extension(".gif"), Some(MediaCategory::Gifs));
        assert_eq!(MediaCategory::from_extension(".txt"), None);
    }

    #[test]
    fn test_enums_serialize_as_stored_names() {
        assert_eq!(serde_json::to_string(&Scaling::Fill).unwrap(), "\"fill\"");
        assert_eq!(serde_json::to_string(&SlideType::Video).unwrap(), "\"Video\"");
        assert_eq!(serde_json::to_string(&ContentKind::Song).unwrap(), "\"song\"");
        assert!(serde_json::from_str::<MediaCategory>("\"Audio\"").is_err());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ThemeId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_ne!(MediaId::generate(), MediaId::generate());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("videos".parse::<MediaCategory>().unwrap(), MediaCategory::Videos);
        assert_eq!("center".parse::<Alignment>().unwrap(), Alignment::Centered);
        let err = "Hymns".parse::<ThemeContext>().unwrap_err();
        assert_eq!(err.code(), Some("PARSE_001"));
    }
}
