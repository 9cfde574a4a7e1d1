//! Media repository.
//!
//! Imported files are copied into the managed media directory under
//! `<Category>/<id><ext>`, and their metadata lives in a JSON array next to
//! them. The file copy and the metadata write are two separate steps; a
//! rejected record removes the file it just copied.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::naming::COPY_SUFFIX;
use crate::error::{Error, Result};
use crate::services::search::{self, Searchable};
use crate::store::{self, Record};
use crate::types::{now, MediaCategory, MediaId, Scaling};

const MODULE: &str = "Media";

/// Metadata of one media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique id, also the stored file stem.
    pub id: MediaId,
    /// Display name.
    pub name: String,
    /// Path relative to the media directory.
    pub path: String,
    /// Category (and sub-directory).
    pub category: MediaCategory,
    /// Comma-joined tags.
    pub tags: String,
    /// Output scaling mode.
    pub scaling: Scaling,
    /// Creation time.
    pub created_at: NaiveDateTime,
    /// Last modification time.
    pub updated_at: NaiveDateTime,
    /// Whether this image is the church logo.
    pub is_logo: bool,
}

impl MediaItem {
    /// Lowercase extension of the stored file, with leading dot.
    pub fn extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }
}

impl Record for MediaItem {
    fn label(&self) -> &str {
        &self.name
    }
}

impl Searchable for MediaItem {
    fn search_name(&self) -> &str {
        &self.name
    }

    fn search_tags(&self) -> &str {
        &self.tags
    }
}

/// Options for importing a file.
#[derive(Debug, Clone, Default)]
pub struct NewMedia {
    /// Display name; the source file name when `None`.
    pub display_name: Option<String>,
    /// Comma-joined tags.
    pub tags: String,
    /// Output scaling mode.
    pub scaling: Scaling,
}

/// Partial metadata update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct MediaUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New category; the file moves to the matching directory.
    pub category: Option<MediaCategory>,
    /// New tags.
    pub tags: Option<String>,
    /// New scaling mode.
    pub scaling: Option<Scaling>,
}

/// Media metadata plus the managed media directory.
#[derive(Debug)]
pub struct MediaRepository {
    metadata_path: PathBuf,
    media_dir: PathBuf,
    items: Vec<MediaItem>,
}

fn is_valid(item: &MediaItem, media_dir: &Path) -> bool {
    !item.name.trim().is_empty() && media_dir.join(&item.path).exists()
}

fn relative_path(category: MediaCategory, file_name: &str) -> String {
    format!("{}/{file_name}", category.name())
}

fn copy_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{COPY_SUFFIX}.{ext}"),
        _ => format!("{name}{COPY_SUFFIX}"),
    }
}

impl MediaRepository {
    /// Open the metadata file and make sure the media directories exist.
    pub fn open(metadata_path: impl Into<PathBuf>, media_dir: impl Into<PathBuf>) -> Result<Self> {
        let metadata_path = metadata_path.into();
        let media_dir = media_dir.into();

        for category in MediaCategory::all() {
            let dir = media_dir.join(category.name());
            fs_err::create_dir_all(&dir).map_err(|e| {
                Error::model(MODULE, "DIR_001", format!("Failed to create media directories: {e}"))
            })?;
        }
        debug!("Ensured media directories under {}", media_dir.display());

        let items = store::load_records(&metadata_path, MODULE, |item| is_valid(item, &media_dir))?;
        Ok(Self { metadata_path, media_dir, items })
    }

    /// Managed media directory.
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Metadata file.
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Number of media items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no media items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Absolute path of a stored item's file.
    pub fn absolute_path(&self, item: &MediaItem) -> PathBuf {
        self.media_dir.join(&item.path)
    }

    fn save(&self) -> Result<()> {
        store::save_records(&self.metadata_path, MODULE, &self.items)
    }

    fn position(&self, id: &MediaId) -> Option<usize> {
        self.items.iter().position(|m| &m.id == id)
    }

    fn sorted<'a>(mut items: Vec<&'a MediaItem>) -> Vec<&'a MediaItem> {
        items.sort_by_cached_key(|m| m.name.to_lowercase());
        items
    }

    /// All items, optionally only one category, sorted by name.
    pub fn all(&self, category: Option<MediaCategory>) -> Vec<&MediaItem> {
        Self::sorted(
            self.items
                .iter()
                .filter(|m| category.map_or(true, |c| m.category == c))
                .collect(),
        )
    }

    /// Item by id.
    pub fn get(&self, id: &MediaId) -> Option<&MediaItem> {
        self.position(id).map(|i| &self.items[i])
    }

    /// Search by name or tag, optionally within a category and tag filter.
    pub fn search(&self, query: &str, category: Option<MediaCategory>, tag: &str) -> Vec<&MediaItem> {
        Self::sorted(
            self.items
                .iter()
                .filter(|m| category.map_or(true, |c| m.category == c))
                .filter(|m| search::name_or_tag_matches(*m, query, tag))
                .collect(),
        )
    }

    /// Sorted unique tags across all items.
    pub fn all_tags(&self) -> Vec<String> {
        search::unique_tags(self.items.iter().map(|m| m.tags.as_str()))
    }

    /// Copy `source` into the media directory and record it.
    pub fn add(&mut self, source: &Path, category: MediaCategory, options: NewMedia) -> Result<&MediaItem> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let Some(ext_category) = MediaCategory::from_extension(&ext) else {
            return Err(Error::model(MODULE, "ADD_001", format!("Unsupported media format: '{ext}'")));
        };
        if ext_category != category {
            return Err(Error::model(
                MODULE,
                "ADD_002",
                format!("Invalid category: {ext} files belong in {ext_category}, not {category}"),
            ));
        }

        let id = MediaId::generate();
        let file_name = format!("{id}{ext}");
        let target = self.media_dir.join(category.name()).join(&file_name);
        fs_err::copy(source, &target).map_err(|e| {
            Error::model(
                MODULE,
                "ADD_003",
                format!("Failed to copy media file {} to {}: {e}", source.display(), target.display()),
            )
        })?;

        let display_name = options
            .display_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| source.file_name().and_then(|n| n.to_str()).map(String::from))
            .unwrap_or_else(|| file_name.clone());
        let stamp = now();
        let item = MediaItem {
            id,
            name: display_name,
            path: relative_path(category, &file_name),
            category,
            tags: options.tags.trim().to_string(),
            scaling: options.scaling,
            created_at: stamp,
            updated_at: stamp,
            is_logo: false,
        };

        if self.items.iter().any(|m| m.path == item.path) {
            discard(&target);
            return Err(Error::model(MODULE, "ADD_004", format!("Media already exists: {}", target.display())));
        }
        if !is_valid(&item, &self.media_dir) {
            discard(&target);
            return Err(Error::model(MODULE, "ADD_005", format!("Invalid media data for {}", item.name)));
        }

        info!("Added media: {} ({})", item.name, item.path);
        self.items.push(item);
        self.save()?;
        Ok(&self.items[self.items.len() - 1])
    }

    /// Update metadata, moving the file when the category changes.
    pub fn update(&mut self, id: &MediaId, update: MediaUpdate) -> Result<&MediaItem> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::model(MODULE, "UPDATE_001", format!("Media not found: {id}")))?;
        let current = self.items[index].clone();

        let mut updated = MediaItem {
            name: update.name.unwrap_or_else(|| current.name.clone()),
            category: update.category.unwrap_or(current.category),
            tags: update
                .tags
                .map_or_else(|| current.tags.clone(), |t| t.trim().to_string()),
            scaling: update.scaling.unwrap_or(current.scaling),
            updated_at: now(),
            ..current.clone()
        };

        let mut moved_from = None;
        if updated.category != current.category {
            let ext = current.extension();
            if MediaCategory::from_extension(&ext) != Some(updated.category) {
                return Err(Error::model(
                    MODULE,
                    "UPDATE_003",
                    format!("Invalid media data for {}: {ext} files cannot be {}", updated.name, updated.category),
                ));
            }
            let file_name = Path::new(&current.path)
                .file_name()
                .and_then(|n| n.to_str())
                .map_or_else(|| format!("{id}{ext}"), String::from);
            updated.path = relative_path(updated.category, &file_name);
            let from = self.media_dir.join(&current.path);
            let to = self.media_dir.join(&updated.path);
            fs_err::rename(&from, &to).map_err(|e| {
                Error::model(
                    MODULE,
                    "UPDATE_002",
                    format!("Failed to move media from {} to {}: {e}", current.path, updated.path),
                )
            })?;
            moved_from = Some((to, from));
        }

        if !is_valid(&updated, &self.media_dir) {
            if let Some((to, from)) = moved_from {
                if let Err(e) = fs_err::rename(&to, &from) {
                    warn!("Could not move media back after rejected update: {e}");
                }
            }
            return Err(Error::model(MODULE, "UPDATE_003", format!("Invalid media data for {}", updated.name)));
        }

        info!("Updated media: {}", updated.name);
        self.items[index] = updated;
        self.save()?;
        Ok(&self.items[index])
    }

    /// Delete the file and its metadata.
    pub fn delete(&mut self, id: &MediaId) -> Result<MediaItem> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::model(MODULE, "DELETE_001", format!("Media not found: {id}")))?;
        let file = self.absolute_path(&self.items[index]);
        match fs_err::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Media file already missing: {}", file.display());
            }
            Err(e) => {
                return Err(Error::model(
                    MODULE,
                    "DELETE_002",
                    format!("Failed to delete media file {}: {e}", file.display()),
                ));
            }
        }
        let removed = self.items.remove(index);
        self.save()?;
        info!("Deleted media: {}", removed.name);
        Ok(removed)
    }

    /// Copy the file under a new id and record it as `"<stem> (Copy).<ext>"`.
    pub fn duplicate(&mut self, id: &MediaId) -> Result<&MediaItem> {
        let source = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::model(MODULE, "DUPLICATE_001", format!("Media not found: {id}")))?;

        let new_id = MediaId::generate();
        let file_name = format!("{new_id}{}", source.extension());
        let path = relative_path(source.category, &file_name);
        let from = self.absolute_path(&source);
        let to = self.media_dir.join(&path);
        fs_err::copy(&from, &to).map_err(|e| {
            Error::model(
                MODULE,
                "DUPLICATE_002",
                format!("Failed to duplicate media {} to {}: {e}", source.path, to.display()),
            )
        })?;

        let stamp = now();
        let copy = MediaItem {
            id: new_id,
            name: copy_name(&source.name),
            path,
            created_at: stamp,
            updated_at: stamp,
            is_logo: false,
            ..source
        };
        if !is_valid(&copy, &self.media_dir) {
            discard(&to);
            return Err(Error::model(
                MODULE,
                "DUPLICATE_003",
                format!("Invalid duplicated media data for {}", copy.name),
            ));
        }

        info!("Duplicated media: {}", copy.name);
        self.items.push(copy);
        self.save()?;
        Ok(&self.items[self.items.len() - 1])
    }

    /// Make an image the logo; every other item loses the flag.
    pub fn set_logo(&mut self, id: &MediaId) -> Result<&MediaItem> {
        let index = self
            .position(id)
            .filter(|&i| self.items[i].category == MediaCategory::Images)
            .ok_or_else(|| {
                Error::model(MODULE, "SET_LOGO_001", format!("Invalid logo media: {id} (must be an image)"))
            })?;
        for item in &mut self.items {
            item.is_logo = &item.id == id;
        }
        self.save()?;
        info!("Set logo: {}", self.items[index].name);
        Ok(&self.items[index])
    }

    /// The current logo, if any.
    pub fn logo(&self) -> Option<&MediaItem> {
        self.items.iter().find(|m| m.is_logo)
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs_err::remove_file(path) {
        warn!("Could not remove rejected media file: {e}");
    }
}
