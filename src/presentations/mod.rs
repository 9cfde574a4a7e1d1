//! Presentation repository.
//!
//! A presentation is an ordered list of `[slide_type, content]` slides plus a
//! theme id. Image and Video slides hold a path relative to the media
//! directory. Media and theme references are only checked when the caller
//! passes them in [`References`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::naming::{COPY_SUFFIX, DEFAULT_THEME_ID};
use crate::error::{Error, Result};
use crate::services::search::{self, Searchable};
use crate::store::{self, Record};
use crate::themes::ThemeRepository;
use crate::types::{now, PresentationId, SlideType, ThemeId};

const MODULE: &str = "Presentations";

/// One `[slide_type, content]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide(pub SlideType, pub String);

impl Slide {
    /// Text slide.
    pub fn text(content: impl Into<String>) -> Self {
        Self(SlideType::Text, content.into())
    }

    /// Slide type.
    pub fn kind(&self) -> SlideType {
        self.0
    }

    /// Text, or media path for Image/Video slides.
    pub fn content(&self) -> &str {
        &self.1
    }
}

/// A stored presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Unique id.
    pub id: PresentationId,
    /// Unique display name.
    pub name: String,
    /// Ordered slides.
    pub slides: Vec<Slide>,
    /// Theme id.
    pub theme: ThemeId,
    /// Comma-joined tags.
    pub tags: String,
    /// Creation time.
    pub created_at: NaiveDateTime,
    /// Last modification time.
    pub updated_at: NaiveDateTime,
}

impl Record for Presentation {
    fn label(&self) -> &str {
        &self.name
    }
}

impl Searchable for Presentation {
    fn search_name(&self) -> &str {
        &self.name
    }

    fn search_tags(&self) -> &str {
        &self.tags
    }
}

/// Optional cross-repository checks applied when validating.
#[derive(Debug, Clone, Copy, Default)]
pub struct References<'a> {
    /// Media directory that Image/Video slide paths must exist under.
    pub media_dir: Option<&'a Path>,
    /// Theme repository the theme id must exist in.
    pub themes: Option<&'a ThemeRepository>,
}

impl<'a> References<'a> {
    /// No reference checks.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check both media paths and theme ids.
    pub fn new(media_dir: &'a Path, themes: &'a ThemeRepository) -> Self {
        Self { media_dir: Some(media_dir), themes: Some(themes) }
    }

    fn check(&self, presentation: &Presentation) -> bool {
        if presentation.id.as_str().is_empty() || presentation.name.trim().is_empty() {
            return false;
        }
        if let Some(media_dir) = self.media_dir {
            for slide in presentation.slides.iter().filter(|s| s.kind().is_media()) {
                if !media_dir.join(slide.content()).exists() {
                    warn!("Invalid media path in presentation {}: {}", presentation.name, slide.content());
                    return false;
                }
            }
        }
        if let Some(themes) = self.themes {
            if !themes.contains(&presentation.theme) {
                warn!("Invalid theme ID in presentation {}: {}", presentation.name, presentation.theme);
                return false;
            }
        }
        true
    }
}

/// Fields of a new presentation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentationDraft {
    /// Display name.
    pub name: String,
    /// Ordered slides.
    #[serde(default)]
    pub slides: Vec<Slide>,
    /// Theme id; `"default"` when absent.
    #[serde(default)]
    pub theme: Option<ThemeId>,
    /// Comma-joined tags.
    #[serde(default)]
    pub tags: String,
}

/// Partial presentation update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PresentationUpdate {
    /// New name.
    pub name: Option<String>,
    /// New slides.
    pub slides: Option<Vec<Slide>>,
    /// New theme id.
    pub theme: Option<ThemeId>,
    /// New tags.
    pub tags: Option<String>,
}

/// Presentations stored in one JSON array.
#[derive(Debug)]
pub struct PresentationRepository {
    path: PathBuf,
    presentations: Vec<Presentation>,
}

impl PresentationRepository {
    /// Open (or create) the presentation file, dropping records whose
    /// references do not resolve.
    pub fn open(path: impl Into<PathBuf>, refs: References<'_>) -> Result<Self> {
        let path = path.into();
        let presentations = store::load_records(&path, MODULE, |p: &Presentation| refs.check(p))?;
        Ok(Self { path, presentations })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of presentations.
    pub fn len(&self) -> usize {
        self.presentations.len()
    }

    /// Whether there are no presentations.
    pub fn is_empty(&self) -> bool {
        self.presentations.is_empty()
    }

    fn save(&self) -> Result<()> {
        store::save_records(&self.path, MODULE, &self.presentations)
    }

    fn position(&self, id: &PresentationId) -> Option<usize> {
        self.presentations.iter().position(|p| &p.id == id)
    }

    fn name_taken(&self, name: &str, except: Option<&PresentationId>) -> bool {
        let name = name.trim().to_lowercase();
        self.presentations
            .iter()
            .any(|p| Some(&p.id) != except && p.name.to_lowercase() == name)
    }

    /// All presentations sorted by name.
    pub fn all(&self) -> Vec<&Presentation> {
        let mut all: Vec<&Presentation> = self.presentations.iter().collect();
        all.sort_by_cached_key(|p| p.name.to_lowercase());
        all
    }

    /// Presentation by id.
    pub fn get(&self, id: &PresentationId) -> Option<&Presentation> {
        self.position(id).map(|i| &self.presentations[i])
    }

    /// Search by name or tag with an optional tag filter.
    pub fn search(&self, query: &str, tag: &str) -> Vec<&Presentation> {
        self.all()
            .into_iter()
            .filter(|p| search::name_or_tag_matches(*p, query, tag))
            .collect()
    }

    /// Sorted unique tags.
    pub fn all_tags(&self) -> Vec<String> {
        search::unique_tags(self.presentations.iter().map(|p| p.tags.as_str()))
    }

    /// Create a presentation with a fresh id.
    pub fn create(&mut self, draft: PresentationDraft, refs: References<'_>) -> Result<&Presentation> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::model(MODULE, "CREATE_001", "Presentation name is required"));
        }
        if self.name_taken(&name, None) {
            return Err(Error::model(MODULE, "CREATE_002", format!("Presentation already exists: {name}")));
        }

        let stamp = now();
        let presentation = Presentation {
            id: PresentationId::generate(),
            name,
            slides: draft.slides,
            theme: draft.theme.unwrap_or_else(|| ThemeId::new(DEFAULT_THEME_ID)),
            tags: draft.tags.trim().to_string(),
            created_at: stamp,
            updated_at: stamp,
        };
        if !refs.check(&presentation) {
            return Err(Error::model(
                MODULE,
                "CREATE_003",
                format!("Invalid presentation data for {}", presentation.name),
            ));
        }

        info!("Created presentation: {}", presentation.name);
        self.presentations.push(presentation);
        self.save()?;
        Ok(&self.presentations[self.presentations.len() - 1])
    }

    /// Update a presentation in place; id and creation time are kept.
    pub fn update(
        &mut self,
        id: &PresentationId,
        update: PresentationUpdate,
        refs: References<'_>,
    ) -> Result<&Presentation> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::model(MODULE, "UPDATE_001", format!("Presentation not found: {id}")))?;
        if let Some(name) = &update.name {
            if self.name_taken(name, Some(id)) {
                return Err(Error::model(
                    MODULE,
                    "UPDATE_002",
                    format!("Presentation name already exists: {name}"),
                ));
            }
        }

        let current = &self.presentations[index];
        let updated = Presentation {
            name: update.name.map_or_else(|| current.name.clone(), |n| n.trim().to_string()),
            slides: update.slides.unwrap_or_else(|| current.slides.clone()),
            theme: update.theme.unwrap_or_else(|| current.theme.clone()),
            tags: update.tags.map_or_else(|| current.tags.clone(), |t| t.trim().to_string()),
            updated_at: now(),
            ..current.clone()
        };
        if !refs.check(&updated) {
            return Err(Error::model(
                MODULE,
                "UPDATE_003",
                format!("Invalid updated presentation data for {}", updated.name),
            ));
        }

        info!("Updated presentation: {}", updated.name);
        self.presentations[index] = updated;
        self.save()?;
        Ok(&self.presentations[index])
    }

    /// Remove a presentation.
    pub fn delete(&mut self, id: &PresentationId) -> Result<Presentation> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::model(MODULE, "DELETE_001", format!("Presentation not found: {id}")))?;
        let removed = self.presentations.remove(index);
        self.save()?;
        info!("Deleted presentation: {}", removed.name);
        Ok(removed)
    }

    /// Copy a presentation as `"<name> (Copy)"` under a fresh id.
    pub fn duplicate(&mut self, id: &PresentationId) -> Result<&Presentation> {
        let source = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::model(MODULE, "DUPLICATE_001", format!("Presentation not found: {id}")))?;
        let name = format!("{}{COPY_SUFFIX}", source.name);
        if self.name_taken(&name, None) {
            return Err(Error::model(
                MODULE,
                "DUPLICATE_002",
                format!("Duplicate presentation name already exists: {name}"),
            ));
        }

        let stamp = now();
        let copy = Presentation {
            id: PresentationId::generate(),
            name,
            created_at: stamp,
            updated_at: stamp,
            ..source
        };
        info!("Duplicated presentation: {}", copy.name);
        self.presentations.push(copy);
        self.save()?;
        Ok(&self.presentations[self.presentations.len() - 1])
    }

    /// Write one presentation to its own JSON file.
    pub fn export(&self, id: &PresentationId, path: &Path) -> Result<()> {
        let presentation = self
            .get(id)
            .ok_or_else(|| Error::model(MODULE, "EXPORT_001", format!("Presentation not found: {id}")))?;
        store::write_json(path, presentation).map_err(|e| {
            Error::model(MODULE, "EXPORT_002", format!("Failed to export presentation to {}: {e}", path.display()))
        })?;
        info!("Exported presentation {} to {}", presentation.name, path.display());
        Ok(())
    }

    /// Create a presentation from an exported JSON file.
    ///
    /// Only `name`, `slides`, `theme` and `tags` are read; the new record gets
    /// its own id and timestamps.
    pub fn import(&mut self, path: &Path, refs: References<'_>) -> Result<&Presentation> {
        let draft: PresentationDraft = store::read_json(path).map_err(|e| {
            Error::model(
                MODULE,
                "IMPORT_001",
                format!("Invalid imported presentation data in {}: {e}", path.display()),
            )
        })?;
        info!("Importing presentation {} from {}", draft.name, path.display());
        self.create(draft, refs)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::themes::tests::draft as theme_draft;
    use crate::types::ThemeContext;
    use tempfile::TempDir;

    fn draft(name: &str) -> PresentationDraft {
        PresentationDraft {
            name: name.to_string(),
            slides: vec![Slide::text("Welcome"), Slide::text("Announcements")],
            ..PresentationDraft::default()
        }
    }

    fn open(dir: &TempDir) -> PresentationRepository {
        PresentationRepository::open(dir.path().join("presentations.json"), References::none()).unwrap()
    }

    #[test]
    fn test_create_defaults_theme() {
        let dir = TempDir::new().unwrap();
        let mut repo = open(&dir);
        let p = repo.create(draft("Sunday"), References::none()).unwrap().clone();
        assert_eq!(p.theme.as_str(), "default");
        assert_eq!(p.slides.len(), 2);

        let reopened = open(&dir);
        assert_eq!(reopened.get(&p.id), Some(&p));
    }

    #[test]
    fn test_slides_serialize_as_pairs() {
        let slide = Slide(SlideType::Image, "Images/a.png".into());
        assert_eq!(serde_json::to_string(&slide).unwrap(), r#"["Image","Images/a.png"]"#);
        assert!(serde_json::from_str::<Slide>(r#"["Audio","x"]"#).is_err());
    }

    #[test]
    fn test_reference_checks() {
        let dir = TempDir::new().unwrap();
        let media_dir = dir.path().join("media");
        fs_err::create_dir_all(media_dir.join("Images")).unwrap();
        fs_err::write(media_dir.join("Images/a.png"), b"x").unwrap();
        let mut themes = ThemeRepository::open(dir.path().join("themes.json")).unwrap();
        let theme = themes.create(theme_draft("Slides", ThemeContext::Presentations)).unwrap().id.clone();
        let refs = References::new(&media_dir, &themes);

        let mut repo = open(&dir);
        let err = repo.create(draft("No Theme"), refs).unwrap_err();
        assert_eq!(err.code(), Some("CREATE_003"));

        let mut ok = draft("Good");
        ok.theme = Some(theme.clone());
        ok.slides.push(Slide(SlideType::Image, "Images/a.png".into()));
        let good = repo.create(ok, refs).unwrap().id.clone();

        let err = repo
            .update(
                &good,
                PresentationUpdate {
                    slides: Some(vec![Slide(SlideType::Video, "Videos/missing.mp4".into())]),
                    ..PresentationUpdate::default()
                },
                refs,
            )
            .unwrap_err();
        assert_eq!(err.code(), Some("UPDATE_003"));

        // Records with dangling references are dropped when loading with checks.
        repo.create(draft("Dangling"), References::none()).unwrap();
        let checked = PresentationRepository::open(dir.path().join("presentations.json"), refs).unwrap();
        assert_eq!(checked.len(), 1);
        assert!(checked.get(&good).is_some());
    }

    #[test]
    fn test_name_uniqueness() {
        let dir = TempDir::new().unwrap();
        let mut repo = open(&dir);
        let a = repo.create(draft("Easter"), References::none()).unwrap().id.clone();
        let b = repo.create(draft("Advent"), References::none()).unwrap().id.clone();

        assert_eq!(
            repo.create(draft("EASTER"), References::none()).unwrap_err().code(),
            Some("CREATE_002")
        );
        assert_eq!(
            repo.create(draft(" "), References::none()).unwrap_err().code(),
            Some("CREATE_001")
        );
        let err = repo
            .update(
                &b,
                PresentationUpdate { name: Some("easter".into()), ..PresentationUpdate::default() },
                References::none(),
            )
            .unwrap_err();
        assert_eq!(err.code(), Some("UPDATE_002"));

        let renamed = repo
            .update(
                &a,
                PresentationUpdate { name: Some("EASTER".into()), ..PresentationUpdate::default() },
                References::none(),
            )
            .unwrap();
        assert_eq!(renamed.name, "EASTER");
    }

    #[test]
    fn test_duplicate_then_delete() {
        let dir = TempDir::new().unwrap();
        let mut repo = open(&dir);
        let a = repo.create(draft("Baptism"), References::none()).unwrap().clone();

        let copy = repo.duplicate(&a.id).unwrap().clone();
        assert_eq!(copy.name, "Baptism (Copy)");
        assert_eq!(copy.slides, a.slides);
        repo.delete(&copy.id).unwrap();

        assert_eq!(repo.all(), vec![&a]);
        assert_eq!(repo.delete(&copy.id).unwrap_err().code(), Some("DELETE_001"));
    }

    #[test]
    fn test_export_import() {
        let dir = TempDir::new().unwrap();
        let mut repo = open(&dir);
        let mut d = draft("Harvest");
        d.tags = "autumn".into();
        let original = repo.create(d, References::none()).unwrap().clone();
        let file = dir.path().join("export/harvest.json");
        repo.export(&original.id, &file).unwrap();

        repo.delete(&original.id).unwrap();
        let imported = repo.import(&file, References::none()).unwrap().clone();
        assert_ne!(imported.id, original.id);
        assert_eq!(imported.name, "Harvest");
        assert_eq!(imported.slides, original.slides);
        assert_eq!(imported.tags, "autumn");

        let bad = dir.path().join("bad.json");
        fs_err::write(&bad, r#"{"slides": []}"#).unwrap();
        assert_eq!(
            repo.import(&bad, References::none()).unwrap_err().code(),
            Some("IMPORT_001")
        );
    }

    #[test]
    fn test_search() {
        let dir = TempDir::new().unwrap();
        let mut repo = open(&dir);
        let mut d = draft("Youth Night");
        d.tags = "youth,friday".into();
        repo.create(d, References::none()).unwrap();
        repo.create(draft("Choir Practice"), References::none()).unwrap();

        assert_eq!(repo.search("night", "").len(), 1);
        assert_eq!(repo.search("friday", "").len(), 1);
        assert_eq!(repo.search("", "youth").len(), 1);
        assert_eq!(repo.search("", "").len(), 2);
        assert_eq!(repo.all_tags(), vec!["friday", "youth"]);
    }
}
