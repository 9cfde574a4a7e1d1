//! Theme repository.
//!
//! A theme bundles the font and color settings applied to displayed text.
//! Names are unique ignoring case; each theme targets one content context.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::naming::COPY_SUFFIX;
use crate::error::{Error, Result};
use crate::services::search::{self, Searchable};
use crate::stage::TextStyle;
use crate::store::{self, Record};
use crate::types::{now, Alignment, ThemeContext, ThemeId};

const MODULE: &str = "Themes";

/// A stored theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Unique id.
    pub id: ThemeId,
    /// Unique display name.
    pub name: String,
    /// Content the theme is meant for.
    pub context: ThemeContext,
    /// Text alignment.
    pub alignment: Alignment,
    /// Text color, `#rrggbb` style.
    pub font_color: String,
    /// Background color, `#rrggbb` style.
    pub background_color: String,
    /// Font size in points.
    pub font_size: u32,
    /// Font family name.
    pub font_family: String,
    /// Comma-joined tags.
    pub tags: String,
    /// Creation time.
    pub created_at: NaiveDateTime,
    /// Last modification time.
    pub updated_at: NaiveDateTime,
}

impl Theme {
    fn is_valid(&self) -> bool {
        !self.id.as_str().is_empty()
            && !self.name.trim().is_empty()
            && is_color(&self.font_color)
            && is_color(&self.background_color)
            && self.font_size > 0
            && !self.font_family.trim().is_empty()
    }

    /// Display style for text rendered with this theme.
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font_color: self.font_color.clone(),
            background_color: self.background_color.clone(),
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            alignment: self.alignment,
        }
    }
}

impl Record for Theme {
    fn label(&self) -> &str {
        &self.name
    }
}

impl Searchable for Theme {
    fn search_name(&self) -> &str {
        &self.name
    }

    fn search_tags(&self) -> &str {
        &self.tags
    }
}

/// `#` followed by 3, 6 or 8 hex digits.
pub fn is_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Fields of a new theme.
#[derive(Debug, Clone)]
pub struct ThemeDraft {
    /// Display name.
    pub name: String,
    /// Target context.
    pub context: ThemeContext,
    /// Text alignment.
    pub alignment: Alignment,
    /// Text color.
    pub font_color: String,
    /// Background color.
    pub background_color: String,
    /// Font size in points.
    pub font_size: u32,
    /// Font family.
    pub font_family: String,
    /// Comma-joined tags.
    pub tags: String,
}

/// Partial theme update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ThemeUpdate {
    /// New name.
    pub name: Option<String>,
    /// New context.
    pub context: Option<ThemeContext>,
    /// New alignment.
    pub alignment: Option<Alignment>,
    /// New text color.
    pub font_color: Option<String>,
    /// New background color.
    pub background_color: Option<String>,
    /// New font size.
    pub font_size: Option<u32>,
    /// New font family.
    pub font_family: Option<String>,
    /// New tags.
    pub tags: Option<String>,
}

/// Themes stored in one JSON array.
#[derive(Debug)]
pub struct ThemeRepository {
    path: PathBuf,
    themes: Vec<Theme>,
}

impl ThemeRepository {
    /// Open (or create) the theme file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let themes = store::load_records(&path, MODULE, Theme::is_valid)?;
        Ok(Self { path, themes })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of themes.
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Whether there are no themes.
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    fn save(&self) -> Result<()> {
        store::save_records(&self.path, MODULE, &self.themes)
    }

    fn position(&self, id: &ThemeId) -> Option<usize> {
        self.themes.iter().position(|t| &t.id == id)
    }

    fn name_taken(&self, name: &str, except: Option<&ThemeId>) -> bool {
        let name = name.trim().to_lowercase();
        self.themes
            .iter()
            .any(|t| Some(&t.id) != except && t.name.to_lowercase() == name)
    }

    /// Themes, optionally for one context, sorted by name.
    pub fn all(&self, context: Option<ThemeContext>) -> Vec<&Theme> {
        let mut themes: Vec<&Theme> = self
            .themes
            .iter()
            .filter(|t| context.map_or(true, |c| t.context == c))
            .collect();
        themes.sort_by_cached_key(|t| t.name.to_lowercase());
        themes
    }

    /// Theme by id.
    pub fn get(&self, id: &ThemeId) -> Option<&Theme> {
        self.position(id).map(|i| &self.themes[i])
    }

    /// Theme by name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Theme> {
        let name = name.trim().to_lowercase();
        self.themes.iter().find(|t| t.name.to_lowercase() == name)
    }

    /// Whether a theme id exists.
    pub fn contains(&self, id: &ThemeId) -> bool {
        self.position(id).is_some()
    }

    /// Search by name or tag within an optional context and tag filter.
    pub fn search(&self, query: &str, context: Option<ThemeContext>, tag: &str) -> Vec<&Theme> {
        self.all(context)
            .into_iter()
            .filter(|t| search::name_or_tag_matches(*t, query, tag))
            .collect()
    }

    /// Sorted unique tags.
    pub fn all_tags(&self) -> Vec<String> {
        search::unique_tags(self.themes.iter().map(|t| t.tags.as_str()))
    }

    /// Create a theme with a fresh id.
    pub fn create(&mut self, draft: ThemeDraft) -> Result<&Theme> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::model(MODULE, "CREATE_001", "Theme name is required"));
        }
        if self.name_taken(&name, None) {
            return Err(Error::model(MODULE, "CREATE_002", format!("Theme already exists: {name}")));
        }

        let stamp = now();
        let theme = Theme {
            id: ThemeId::generate(),
            name,
            context: draft.context,
            alignment: draft.alignment,
            font_color: draft.font_color.trim().to_string(),
            background_color: draft.background_color.trim().to_string(),
            font_size: draft.font_size,
            font_family: draft.font_family.trim().to_string(),
            tags: draft.tags.trim().to_string(),
            created_at: stamp,
            updated_at: stamp,
        };
        if !theme.is_valid() {
            return Err(Error::model(MODULE, "CREATE_003", format!("Invalid theme data for {}", theme.name)));
        }

        info!("Created theme: {}", theme.name);
        self.themes.push(theme);
        self.save()?;
        Ok(&self.themes[self.themes.len() - 1])
    }

    /// Update a theme in place; id and creation time are kept.
    pub fn update(&mut self, id: &ThemeId, update: ThemeUpdate) -> Result<&Theme> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::model(MODULE, "UPDATE_001", format!("Theme not found: {id}")))?;
        if let Some(name) = &update.name {
            if self.name_taken(name, Some(id)) {
                return Err(Error::model(MODULE, "UPDATE_002", format!("Theme name already exists: {name}")));
            }
        }

        let current = &self.themes[index];
        let updated = Theme {
            name: update.name.map_or_else(|| current.name.clone(), |n| n.trim().to_string()),
            context: update.context.unwrap_or(current.context),
            alignment: update.alignment.unwrap_or(current.alignment),
            font_color: update
                .font_color
                .map_or_else(|| current.font_color.clone(), |c| c.trim().to_string()),
            background_color: update
                .background_color
                .map_or_else(|| current.background_color.clone(), |c| c.trim().to_string()),
            font_size: update.font_size.unwrap_or(current.font_size),
            font_family: update
                .font_family
                .map_or_else(|| current.font_family.clone(), |f| f.trim().to_string()),
            tags: update.tags.map_or_else(|| current.tags.clone(), |t| t.trim().to_string()),
            updated_at: now(),
            ..current.clone()
        };
        if !updated.is_valid() {
            return Err(Error::model(
                MODULE,
                "UPDATE_003",
                format!("Invalid updated theme data for {}", updated.name),
            ));
        }

        info!("Updated theme: {}", updated.name);
        self.themes[index] = updated;
        self.save()?;
        Ok(&self.themes[index])
    }

    /// Remove a theme.
    pub fn delete(&mut self, id: &ThemeId) -> Result<Theme> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::model(MODULE, "DELETE_001", format!("Theme not found: {id}")))?;
        let removed = self.themes.remove(index);
        self.save()?;
        info!("Deleted theme: {}", removed.name);
        Ok(removed)
    }

    /// Copy a theme as `"<name> (Copy)"` under a fresh id.
    pub fn duplicate(&mut self, id: &ThemeId) -> Result<&Theme> {
        let source = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::model(MODULE, "DUPLICATE_001", format!("Theme not found: {id}")))?;
        let name = format!("{}{COPY_SUFFIX}", source.name);
        if self.name_taken(&name, None) {
            return Err(Error::model(
                MODULE,
                "DUPLICATE_002",
                format!("Duplicate theme name already exists: {name}"),
            ));
        }

        let stamp = now();
        let copy = Theme {
            id: ThemeId::generate(),
            name,
            created_at: stamp,
            updated_at: stamp,
            ..source
        };
        info!("Duplicated theme: {}", copy.name);
        self.themes.push(copy);
        self.save()?;
        Ok(&self.themes[self.themes.len() - 1])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use tempfile::TempDir;

    pub(crate) fn draft(name: &str, context: ThemeContext) -> ThemeDraft {
        ThemeDraft {
            name: name.to_string(),
            context,
            alignment: Alignment::Centered,
            font_color: "#ffffff".into(),
            background_color: "#000000".into(),
            font_size: 32,
            font_family: "Georgia".into(),
            tags: String::new(),
        }
    }

    fn open(dir: &TempDir) -> ThemeRepository {
        ThemeRepository::open(dir.path().join("themes/themes.json")).unwrap()
    }

    #[test]
    fn test_is_color() {
        assert!(is_color("#fff"));
        assert!(is_color("#2c3e50"));
        assert!(is_color("#2C3E50FF"));
        assert!(!is_color("2c3e50"));
        assert!(!is_color("#zzzzzz"));
        assert!(!is_color("#12345"));
    }

    #[test]
    fn test_create_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut themes = open(&dir);
        let created = themes.create(draft("Night", ThemeContext::Songs)).unwrap().clone();

        let reopened = open(&dir);
        assert_eq!(reopened.get(&created.id), Some(&created));
        assert_eq!(reopened.find_by_name("NIGHT").map(|t| &t.id), Some(&created.id));
    }

    #[test]
    fn test_create_rejections() {
        let dir = TempDir::new().unwrap();
        let mut themes = open(&dir);
        themes.create(draft("Night", ThemeContext::Songs)).unwrap();

        let err = themes.create(draft("  ", ThemeContext::Songs)).unwrap_err();
        assert_eq!(err.code(), Some("CREATE_001"));
        let err = themes.create(draft("night", ThemeContext::Scriptures)).unwrap_err();
        assert_eq!(err.code(), Some("CREATE_002"));
        let mut bad = draft("Zero", ThemeContext::Songs);
        bad.font_size = 0;
        assert_eq!(themes.create(bad).unwrap_err().code(), Some("CREATE_003"));
        let mut bad = draft("Plain", ThemeContext::Songs);
        bad.font_color = "white".into();
        assert_eq!(themes.create(bad).unwrap_err().code(), Some("CREATE_003"));
        assert_eq!(themes.len(), 1);
    }

    #[test]
    fn test_update_keeps_identity() {
        let dir = TempDir::new().unwrap();
        let mut themes = open(&dir);
        let a = themes.create(draft("A", ThemeContext::Songs)).unwrap().clone();
        themes.create(draft("B", ThemeContext::Songs)).unwrap();

        let err = themes
            .update(&a.id, ThemeUpdate { name: Some("b".into()), ..ThemeUpdate::default() })
            .unwrap_err();
        assert_eq!(err.code(), Some("UPDATE_002"));

        let err = themes
            .update(&a.id, ThemeUpdate { background_color: Some("red".into()), ..ThemeUpdate::default() })
            .unwrap_err();
        assert_eq!(err.code(), Some("UPDATE_003"));

        let updated = themes
            .update(&a.id, ThemeUpdate { font_size: Some(40), ..ThemeUpdate::default() })
            .unwrap()
            .clone();
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.created_at, a.created_at);
        assert_eq!(updated.font_size, 40);
        assert_eq!(updated.name, "A");
    }

    #[test]
    fn test_duplicate_then_delete_restores_repository() {
        let dir = TempDir::new().unwrap();
        let mut themes = open(&dir);
        let a = themes.create(draft("Morning", ThemeContext::Presentations)).unwrap().clone();

        let copy = themes.duplicate(&a.id).unwrap().clone();
        assert_eq!(copy.name, "Morning (Copy)");
        assert_eq!(
            themes.duplicate(&a.id).unwrap_err().code(),
            Some("DUPLICATE_002")
        );

        themes.delete(&copy.id).unwrap();
        assert_eq!(themes.all(None), vec![&a]);
        assert_eq!(themes.delete(&copy.id).unwrap_err().code(), Some("DELETE_001"));
    }

    #[test]
    fn test_filter_and_search() {
        let dir = TempDir::new().unwrap();
        let mut themes = open(&dir);
        let mut d = draft("Advent Blue", ThemeContext::Songs);
        d.tags = "advent,seasonal".into();
        themes.create(d).unwrap();
        themes.create(draft("Scripture Gold", ThemeContext::Scriptures)).unwrap();

        assert_eq!(themes.all(Some(ThemeContext::Scriptures)).len(), 1);
        assert_eq!(themes.search("advent", None, "").len(), 1);
        assert!(themes.search("advent", Some(ThemeContext::Scriptures), "").is_empty());
        assert_eq!(themes.search("", None, "seasonal").len(), 1);
        assert_eq!(themes.all_tags(), vec!["advent", "seasonal"]);
    }

    #[test]
    fn test_style() {
        let dir = TempDir::new().unwrap();
        let mut themes = open(&dir);
        let theme = themes.create(draft("Bold", ThemeContext::Songs)).unwrap();
        let style = theme.style();
        assert_eq!(style.font_size, 32);
        assert_eq!(style.font_color, "#ffffff");
        assert_eq!(style.alignment, Alignment::Centered);
    }
}
