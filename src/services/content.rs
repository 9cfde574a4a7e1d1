//! Content resolution.
//!
//! Turns a reference to library content (a song title, media id, presentation
//! slide or scripture reference) into [`DisplayContent`] for a display
//! surface, applying the selected theme.

use crate::error::{Error, Result};
use crate::library::Library;
use crate::stage::{DisplayContent, TextStyle};
use crate::themes::Theme;
use crate::types::{MediaId, PresentationId, SlideType};

const MODULE: &str = "Content";

/// A pointer to something that can be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// Song by title.
    Song {
        /// Song title (case-insensitive).
        title: String,
    },
    /// Media item by id.
    Media {
        /// Media id.
        id: MediaId,
    },
    /// One slide of a presentation.
    Presentation {
        /// Presentation id.
        id: PresentationId,
        /// Zero-based slide index.
        slide: usize,
    },
    /// A scripture passage.
    Scripture {
        /// Bible id.
        bible: String,
        /// Reference such as `John 3:16-18`.
        reference: String,
    },
}

fn not_found(what: &str, key: &str) -> Error {
    Error::model(MODULE, "NOT_FOUND", format!("{what} not found: {key}"))
}

fn style_for(theme: Option<&Theme>) -> TextStyle {
    theme.map(Theme::style).unwrap_or_default()
}

/// Resolve a reference into displayable content.
///
/// Text is styled with `theme` when given. Presentations without an explicit
/// theme use their own theme if it still exists.
pub fn resolve(library: &Library, content: &ContentRef, theme: Option<&Theme>) -> Result<DisplayContent> {
    let playback = library.playback();
    match content {
        ContentRef::Song { title } => {
            let song = library.songs.get(title).ok_or_else(|| not_found("Song", title))?;
            Ok(DisplayContent::text(song.render_text(), style_for(theme)))
        }
        ContentRef::Media { id } => {
            let item = library.media.get(id).ok_or_else(|| not_found("Media", id.as_str()))?;
            Ok(DisplayContent::media(library.media.absolute_path(item), playback))
        }
        ContentRef::Presentation { id, slide } => {
            let presentation = library
                .presentations
                .get(id)
                .ok_or_else(|| not_found("Presentation", id.as_str()))?;
            let current = presentation.slides.get(*slide).ok_or_else(|| {
                Error::model(
                    MODULE,
                    "SLIDE_001",
                    format!(
                        "Slide {slide} out of range for {} ({} slides)",
                        presentation.name,
                        presentation.slides.len()
                    ),
                )
            })?;
            let theme = theme.or_else(|| library.themes.get(&presentation.theme));
            Ok(match current.kind() {
                SlideType::Text => DisplayContent::text(current.content(), style_for(theme)),
                SlideType::Image | SlideType::Video => {
                    DisplayContent::media(library.media.media_dir().join(current.content()), playback)
                }
            })
        }
        ContentRef::Scripture { bible, reference } => {
            if library.bibles.get(bible).is_none() {
                return Err(not_found("Bible", bible));
            }
            let passage = library.bibles.lookup(bible, reference)?;
            let text = format!("{}\n\n{}", passage.text, passage.reference);
            Ok(DisplayContent::text(text, style_for(theme)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::presentations::{PresentationDraft, Slide};
    use crate::settings::Settings;
    use crate::songs::{Section, SongDraft};
    use crate::themes::tests::draft as theme_draft;
    use crate::types::ThemeContext;
    use tempfile::TempDir;

    fn library(dir: &TempDir) -> Library {
        let settings = Settings::open(dir.path().join("config/settings.json"), dir.path()).unwrap();
        Library::open(&settings).unwrap()
    }

    #[test]
    fn test_song_resolves_to_styled_lyrics() {
        let dir = TempDir::new().unwrap();
        let mut lib = library(&dir);
        lib.songs
            .add(SongDraft {
                title: "Amazing Grace".into(),
                sections: vec![Section::new("Verse 1", "Amazing grace")],
                tags: String::new(),
            })
            .unwrap();
        let theme = lib.themes.create(theme_draft("Big", ThemeContext::Songs)).unwrap().clone();

        let content = resolve(&lib, &ContentRef::Song { title: "amazing grace".into() }, Some(&theme)).unwrap();
        match content {
            DisplayContent::Text { text, style } => {
                assert_eq!(text, "Verse 1:\nAmazing grace");
                assert_eq!(style.font_size, 32);
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = resolve(&lib, &ContentRef::Song { title: "Missing".into() }, None).unwrap_err();
        assert_eq!(err.code(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_presentation_uses_its_own_theme() {
        let dir = TempDir::new().unwrap();
        let mut lib = library(&dir);
        let theme = lib.themes.create(theme_draft("Slides", ThemeContext::Presentations)).unwrap().id.clone();
        let id = lib
            .create_presentation(PresentationDraft {
                name: "Welcome".into(),
                slides: vec![Slide::text("Good morning")],
                theme: Some(theme),
                tags: String::new(),
            })
            .unwrap()
            .id
            .clone();

        let content = resolve(&lib, &ContentRef::Presentation { id: id.clone(), slide: 0 }, None).unwrap();
        assert!(matches!(content, DisplayContent::Text { ref style, .. } if style.font_family == "Georgia"));

        let err = resolve(&lib, &ContentRef::Presentation { id, slide: 3 }, None).unwrap_err();
        assert_eq!(err.code(), Some("SLIDE_001"));
    }
}
