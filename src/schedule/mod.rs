//! Service schedule: the running order of a service.
//!
//! Items point at library content by kind and id (song title, media id,
//! presentation id, or `bible_id:reference` for scripture). A schedule can be
//! exported to and imported from a JSON array.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::services::content::ContentRef;
use crate::store;
use crate::types::{ContentKind, MediaId, PresentationId};

const MODULE: &str = "Schedule";

/// One entry of the running order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Kind of content.
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Content key: song title, media or presentation id, `bible:reference`.
    pub id: String,
    /// Label shown in the running order.
    pub title: String,
}

impl ScheduleItem {
    /// Create an item.
    pub fn new(kind: ContentKind, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { kind, id: id.into(), title: title.into() }
    }

    /// Scripture item for a reference in a given bible.
    pub fn scripture(bible: &str, reference: &str) -> Self {
        Self::new(ContentKind::Scripture, format!("{bible}:{reference}"), reference)
    }

    /// Reference used to resolve the item against the library.
    pub fn content_ref(&self) -> Result<ContentRef> {
        Ok(match self.kind {
            ContentKind::Song => ContentRef::Song { title: self.id.clone() },
            ContentKind::Media => ContentRef::Media { id: MediaId::new(self.id.clone()) },
            ContentKind::Presentation => ContentRef::Presentation {
                id: PresentationId::new(self.id.clone()),
                slide: 0,
            },
            ContentKind::Scripture => {
                let (bible, reference) = self
                    .id
                    .split_once(':')
                    .filter(|(b, r)| !b.is_empty() && !r.trim().is_empty())
                    .ok_or_else(|| {
                        Error::model(MODULE, "ITEM_001", format!("Invalid scripture item: {}", self.id))
                    })?;
                ContentRef::Scripture { bible: bible.to_string(), reference: reference.trim().to_string() }
            }
        })
    }
}

/// Ordered list of schedule items.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    items: Vec<ScheduleItem>,
}

impl Schedule {
    /// Empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in running order.
    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the schedule is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item.
    pub fn add(&mut self, item: ScheduleItem) {
        info!("Added to schedule: {}", item.title);
        self.items.push(item);
    }

    /// Remove the item at `index`.
    pub fn remove(&mut self, index: usize) -> Result<ScheduleItem> {
        if index >= self.items.len() {
            return Err(Error::model(MODULE, "REMOVE_001", format!("No schedule item at position {index}")));
        }
        let removed = self.items.remove(index);
        info!("Removed from schedule: {}", removed.title);
        Ok(removed)
    }

    /// Move the item at `from` so it ends up at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        if from >= len || to >= len {
            return Err(Error::model(
                MODULE,
                "MOVE_001",
                format!("Cannot move schedule item {from} to {to} (length {len})"),
            ));
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        info!("Schedule cleared");
    }

    /// Write the schedule as a JSON array.
    pub fn export(&self, path: &Path) -> Result<()> {
        store::write_json(path, &self.items).map_err(|e| {
            Error::model(MODULE, "EXPORT_001", format!("Failed to export schedule to {}: {e}", path.display()))
        })?;
        info!("Exported schedule ({} items) to {}", self.items.len(), path.display());
        Ok(())
    }

    /// Replace the schedule with the items of a JSON array file.
    ///
    /// Entries that fail to decode are skipped.
    pub fn import(&mut self, path: &Path) -> Result<usize> {
        let value: Value = store::read_json(path).map_err(|e| {
            Error::model(MODULE, "IMPORT_001", format!("Failed to import schedule from {}: {e}", path.display()))
        })?;
        let Value::Array(entries) = value else {
            return Err(Error::model(MODULE, "IMPORT_001", format!("{} is not a list", path.display())));
        };

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<ScheduleItem>(entry) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping invalid schedule entry: {e}"),
            }
        }
        self.items = items;
        info!("Imported schedule ({} items) from {}", self.items.len(), path.display());
        Ok(self.items.len())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use tempfile::TempDir;

    fn sample() -> Schedule {
        let mut schedule = Schedule::new();
        schedule.add(ScheduleItem::new(ContentKind::Song, "Amazing Grace", "Amazing Grace"));
        schedule.add(ScheduleItem::scripture("kjv", "John 3:16"));
        schedule.add(ScheduleItem::new(ContentKind::Presentation, "p-1", "Announcements"));
        schedule
    }

    #[test]
    fn test_move_and_remove() {
        let mut schedule = sample();
        schedule.move_item(2, 0).unwrap();
        let titles: Vec<&str> = schedule.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Announcements", "Amazing Grace", "John 3:16"]);

        assert_eq!(schedule.move_item(0, 3).unwrap_err().code(), Some("MOVE_001"));
        assert_eq!(schedule.remove(1).unwrap().title, "Amazing Grace");
        assert_eq!(schedule.remove(5).unwrap_err().code(), Some("REMOVE_001"));
        schedule.clear();
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_content_ref() {
        let schedule = sample();
        assert_eq!(
            schedule.items()[1].content_ref().unwrap(),
            ContentRef::Scripture { bible: "kjv".into(), reference: "John 3:16".into() }
        );
        assert_eq!(
            schedule.items()[2].content_ref().unwrap(),
            ContentRef::Presentation { id: PresentationId::new("p-1"), slide: 0 }
        );
        let bad = ScheduleItem::new(ContentKind::Scripture, "John 3", "John 3");
        assert_eq!(bad.content_ref().unwrap_err().code(), Some("ITEM_001"));
    }

    #[test]
    fn test_export_import() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("service.json");
        let schedule = sample();
        schedule.export(&path).unwrap();

        let text = fs_err::read_to_string(&path).unwrap();
        assert!(text.contains("\"type\": \"scripture\""));

        let mut imported = Schedule::new();
        assert_eq!(imported.import(&path).unwrap(), 3);
        assert_eq!(imported.items(), schedule.items());
    }

    #[test]
    fn test_import_skips_bad_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("service.json");
        fs_err::write(
            &path,
            r#"[{"type": "song", "id": "A", "title": "A"}, {"type": "hymnal", "id": "x", "title": "x"}, 4]"#,
        )
        .unwrap();

        let mut schedule = sample();
        assert_eq!(schedule.import(&path).unwrap(), 1);
        assert_eq!(schedule.items()[0].id, "A");

        fs_err::write(&path, r#"{"type": "song"}"#).unwrap();
        assert_eq!(schedule.import(&path).unwrap_err().code(), Some("IMPORT_001"));
    }
}
