//! All content repositories, opened together from the settings.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::bible::BibleRepository;
use crate::error::Result;
use crate::media::MediaRepository;
use crate::presentations::{
    Presentation, PresentationDraft, PresentationRepository, PresentationUpdate, References,
};
use crate::settings::{DataPaths, Settings};
use crate::songs::SongRepository;
use crate::stage::Playback;
use crate::themes::ThemeRepository;
use crate::types::PresentationId;

/// Record counts per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LibrarySummary {
    /// Songs.
    pub songs: usize,
    /// Media items.
    pub media: usize,
    /// Presentations.
    pub presentations: usize,
    /// Themes.
    pub themes: usize,
    /// Bibles.
    pub bibles: usize,
}

/// The content library.
#[derive(Debug)]
pub struct Library {
    paths: DataPaths,
    playback: Playback,
    /// Songs.
    pub songs: SongRepository,
    /// Media files and metadata.
    pub media: MediaRepository,
    /// Themes.
    pub themes: ThemeRepository,
    /// Presentations.
    pub presentations: PresentationRepository,
    /// Bibles.
    pub bibles: BibleRepository,
}

impl Library {
    /// Open every repository at the configured paths.
    pub fn open(settings: &Settings) -> Result<Self> {
        Self::open_paths(settings.paths(), settings.playback())
    }

    /// Open every repository at explicit paths.
    ///
    /// Themes and media load before presentations so that presentation
    /// references can be checked.
    pub fn open_paths(paths: DataPaths, playback: Playback) -> Result<Self> {
        let songs = SongRepository::open(&paths.songs)?;
        let media = MediaRepository::open(&paths.media_metadata, &paths.media)?;
        let themes = ThemeRepository::open(&paths.themes)?;
        let presentations = PresentationRepository::open(
            &paths.presentations,
            References::new(media.media_dir(), &themes),
        )?;
        let bibles = BibleRepository::open(&paths.bibles)?;

        let library = Self { paths, playback, songs, media, themes, presentations, bibles };
        let summary = library.summary();
        info!(
            "Library opened: {} songs, {} media, {} presentations, {} themes, {} bibles",
            summary.songs, summary.media, summary.presentations, summary.themes, summary.bibles
        );
        Ok(library)
    }

    /// Resolved content paths.
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Media playback options.
    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Record counts.
    pub fn summary(&self) -> LibrarySummary {
        LibrarySummary {
            songs: self.songs.len(),
            media: self.media.len(),
            presentations: self.presentations.len(),
            themes: self.themes.len(),
            bibles: self.bibles.len(),
        }
    }

    /// Create a presentation, checking its media and theme references.
    pub fn create_presentation(&mut self, draft: PresentationDraft) -> Result<&Presentation> {
        let refs = References::new(self.media.media_dir(), &self.themes);
        self.presentations.create(draft, refs)
    }

    /// Update a presentation, checking its media and theme references.
    pub fn update_presentation(
        &mut self,
        id: &PresentationId,
        update: PresentationUpdate,
    ) -> Result<&Presentation> {
        let refs = References::new(self.media.media_dir(), &self.themes);
        self.presentations.update(id, update, refs)
    }

    /// Import an exported presentation, checking its references.
    pub fn import_presentation(&mut self, path: &Path) -> Result<&Presentation> {
        let refs = References::new(self.media.media_dir(), &self.themes);
        self.presentations.import(path, refs)
    }
}
