//! Song repository.
//!
//! Songs are keyed by title (case-insensitive) and stored as one JSON array.
//! Each song is an ordered list of `[section_type, text]` pairs such as
//! `["Verse 1", "Amazing grace..."]`.

pub mod hymn;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::naming::COPY_SUFFIX;
use crate::error::{Error, Result};
use crate::services::search::{self, CompositeSearch, Searchable};
use crate::store::{self, Record};
use crate::types::now;

const MODULE: &str = "Songs";

/// One `[section_type, text]` pair of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section(pub String, pub String);

impl Section {
    /// Create a section.
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self(kind.into(), text.into())
    }

    /// Section type, e.g. `Verse 1` or `Chorus`.
    pub fn kind(&self) -> &str {
        &self.0
    }

    /// Lyrics of the section.
    pub fn text(&self) -> &str {
        &self.1
    }
}

/// A stored song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique title.
    pub title: String,
    /// Ordered lyric sections.
    pub sections: Vec<Section>,
    /// Comma-joined tags.
    pub tags: String,
    /// Creation time.
    pub created_at: NaiveDateTime,
    /// Last modification time.
    pub updated_at: NaiveDateTime,
}

impl Song {
    fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Lyrics as projected: each section as `type:\ntext`, blank line between.
    pub fn render_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("{}:\n{}", s.kind(), s.text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Record for Song {
    fn label(&self) -> &str {
        &self.title
    }
}

impl Searchable for Song {
    fn search_name(&self) -> &str {
        &self.title
    }

    fn search_tags(&self) -> &str {
        &self.tags
    }
}

/// Fields for a new song.
#[derive(Debug, Clone, Default)]
pub struct SongDraft {
    /// Title, must be unique.
    pub title: String,
    /// Lyric sections.
    pub sections: Vec<Section>,
    /// Comma-joined tags.
    pub tags: String,
}

/// Partial update of a song; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct SongUpdate {
    /// New title.
    pub title: Option<String>,
    /// New sections.
    pub sections: Option<Vec<Section>>,
    /// New tags.
    pub tags: Option<String>,
}

/// Which part of a song a search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Substring of the title.
    #[default]
    Title,
    /// Substring of any section text.
    Lyrics,
    /// Substring of any tag.
    Tags,
    /// Ranked fuzzy title match, liturgical names included.
    Fuzzy,
}

impl std::str::FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "lyrics" => Ok(Self::Lyrics),
            "tags" => Ok(Self::Tags),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(Error::model(
                MODULE,
                "PARSE_001",
                format!("unknown search mode '{other}', expected title, lyrics, tags or fuzzy"),
            )),
        }
    }
}

/// Songs loaded from one JSON file.
#[derive(Debug)]
pub struct SongRepository {
    path: PathBuf,
    songs: Vec<Song>,
}

impl SongRepository {
    /// Open (or create) the song file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let songs = store::load_records(&path, MODULE, Song::is_valid)?;
        Ok(Self { path, songs })
    }

    /// File backing this repository.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of songs.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether there are no songs.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    fn save(&self) -> Result<()> {
        store::save_records(&self.path, MODULE, &self.songs)
    }

    fn position(&self, title: &str) -> Option<usize> {
        let title = title.to_lowercase();
        self.songs.iter().position(|s| s.title.to_lowercase() == title)
    }

    fn title_taken(&self, title: &str, except: Option<usize>) -> bool {
        self.position(title).is_some_and(|i| Some(i) != except)
    }

    /// All songs sorted by title.
    pub fn all(&self) -> Vec<&Song> {
        let mut songs: Vec<&Song> = self.songs.iter().collect();
        songs.sort_by_cached_key(|s| s.title.to_lowercase());
        songs
    }

    /// Song with the given title (case-insensitive).
    pub fn get(&self, title: &str) -> Option<&Song> {
        self.position(title).map(|i| &self.songs[i])
    }

    /// Search songs, optionally restricted to those whose tags contain `tag`.
    pub fn search(&self, query: &str, mode: SearchMode, tag: &str) -> Vec<&Song> {
        let query = query.trim().to_lowercase();
        let candidates: Vec<&Song> = self
            .songs
            .iter()
            .filter(|s| search::tag_filter_matches(&s.tags, tag))
            .collect();

        if mode == SearchMode::Fuzzy {
            let names: Vec<&str> = candidates.iter().map(|s| s.title.as_str()).collect();
            let strategy = CompositeSearch::with_defaults();
            return search::SearchStrategy::rank(&strategy, &query, &names, candidates.len())
                .into_iter()
                .map(|i| candidates[i])
                .collect();
        }

        let mut results: Vec<&Song> = candidates
            .into_iter()
            .filter(|song| match mode {
                SearchMode::Title | SearchMode::Fuzzy => song.title.to_lowercase().contains(&query),
                SearchMode::Lyrics => song
                    .sections
                    .iter()
                    .any(|s| s.text().to_lowercase().contains(&query)),
                SearchMode::Tags => search::any_tag_contains(&song.tags, &query),
            })
            .collect();
        results.sort_by_cached_key(|s| s.title.to_lowercase());
        results
    }

    /// Sorted unique tags across all songs.
    pub fn all_tags(&self) -> Vec<String> {
        search::unique_tags(self.songs.iter().map(|s| s.tags.as_str()))
    }

    /// Number of songs carrying each tag.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        search::tag_counts(self.songs.iter().map(|s| s.tags.as_str()))
    }

    /// Add a new song.
    pub fn add(&mut self, draft: SongDraft) -> Result<&Song> {
        if draft.title.trim().is_empty() {
            return Err(Error::model(MODULE, "ADD_001", "Cannot add song: title is empty"));
        }
        if self.title_taken(&draft.title, None) {
            return Err(Error::model(
                MODULE,
                "ADD_002",
                format!("Cannot add song: title '{}' already exists", draft.title),
            ));
        }

        let stamp = now();
        let song = Song {
            title: draft.title,
            sections: draft.sections,
            tags: draft.tags.trim().to_string(),
            created_at: stamp,
            updated_at: stamp,
        };
        if !song.is_valid() {
            return Err(Error::model(
                MODULE,
                "ADD_003",
                format!("Cannot add song: invalid data for '{}'", song.title),
            ));
        }

        info!("Added song: {}", song.title);
        self.songs.push(song);
        self.save()?;
        Ok(&self.songs[self.songs.len() - 1])
    }

    /// Update the song currently titled `old_title`.
    pub fn update(&mut self, old_title: &str, update: SongUpdate) -> Result<&Song> {
        let index = self.position(old_title).ok_or_else(|| {
            Error::model(
                MODULE,
                "UPDATE_001",
                format!("Cannot update song: title '{old_title}' not found"),
            )
        })?;

        if let Some(title) = update.title.as_deref() {
            if !title.trim().is_empty() && self.title_taken(title, Some(index)) {
                return Err(Error::model(
                    MODULE,
                    "UPDATE_002",
                    format!("Cannot update song: new title '{title}' already exists"),
                ));
            }
        }

        let current = &self.songs[index];
        let updated = Song {
            title: update.title.unwrap_or_else(|| current.title.clone()),
            sections: update.sections.unwrap_or_else(|| current.sections.clone()),
            tags: update
                .tags
                .map_or_else(|| current.tags.clone(), |t| t.trim().to_string()),
            created_at: current.created_at,
            updated_at: now(),
        };
        if !updated.is_valid() {
            return Err(Error::model(
                MODULE,
                "UPDATE_003",
                format!("Cannot update song: invalid data for '{}'", updated.title),
            ));
        }

        info!("Updated song: {old_title} -> {}", updated.title);
        self.songs[index] = updated;
        self.save()?;
        Ok(&self.songs[index])
    }

    /// Delete a song by title.
    pub fn delete(&mut self, title: &str) -> Result<Song> {
        let index = self.position(title).ok_or_else(|| {
            Error::model(
                MODULE,
                "DELETE_001",
                format!("Cannot delete song: title '{title}' not found"),
            )
        })?;
        let removed = self.songs.remove(index);
        self.save()?;
        info!("Deleted song: {}", removed.title);
        Ok(removed)
    }

    /// Copy a song under the title `"<title> (Copy)"`.
    pub fn duplicate(&mut self, title: &str) -> Result<&Song> {
        let source = self.get(title).ok_or_else(|| {
            Error::model(
                MODULE,
                "DUPLICATE_001",
                format!("Cannot duplicate song: title '{title}' not found"),
            )
        })?;

        let new_title = format!("{}{COPY_SUFFIX}", source.title);
        if self.title_taken(&new_title, None) {
            return Err(Error::model(
                MODULE,
                "DUPLICATE_002",
                format!("Cannot duplicate song: title '{new_title}' already exists"),
            ));
        }

        let stamp = now();
        let copy = Song {
            title: new_title,
            created_at: stamp,
            updated_at: stamp,
            ..source.clone()
        };
        info!("Duplicated song: {title} -> {}", copy.title);
        self.songs.push(copy);
        self.save()?;
        Ok(&self.songs[self.songs.len() - 1])
    }
}
