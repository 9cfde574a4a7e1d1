//! Import of plain-text hymn files.
//!
//! A hymnal directory holds one `.txt` file per hymn, named like
//! `#510 - Jesus Shall Reign.txt` or `510. Jesus Shall Reign.txt`. Stanzas are
//! separated by blank lines. Stanzas are numbered as verses, except that a
//! short stanza repeated word for word becomes a `Chorus`.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Section, SongDraft, SongRepository};
use crate::constants::naming::HYMN_TAG;
use crate::constants::search::MAX_CHORUS_LINES;
use crate::error::{Error, Result};

lazy_static! {
    /// Regex matching hymnal filenames like `#510 - Jesus Shall Reign`.
    #[allow(clippy::expect_used)]
    static ref RE_HASH_FILENAME: Regex =
        Regex::new(r"^#(\d+)\s*-\s*(.+)$").expect("valid regex: RE_HASH_FILENAME");

    /// Regex matching numbered filenames like `510. Jesus Shall Reign`.
    #[allow(clippy::expect_used)]
    static ref RE_DOT_FILENAME: Regex =
        Regex::new(r"^(\d+)\.\s*(.+)$").expect("valid regex: RE_DOT_FILENAME");
}

/// A hymn parsed from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHymn {
    /// Hymn number, when the filename carries one.
    pub number: Option<u32>,
    /// Title taken from the filename.
    pub title: String,
    /// Verse/chorus sections.
    pub sections: Vec<Section>,
}

impl ParsedHymn {
    /// Convert into a song draft tagged `hymn`.
    pub fn into_draft(self) -> SongDraft {
        SongDraft {
            title: self.title,
            sections: self.sections,
            tags: HYMN_TAG.to_string(),
        }
    }
}

/// Outcome of a directory import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Titles added to the repository.
    pub imported: Vec<String>,
    /// Files skipped, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imported {} hymns, skipped {}", self.imported.len(), self.skipped.len())?;
        for (path, reason) in &self.skipped {
            write!(f, "\n  {}: {reason}", path.display())?;
        }
        Ok(())
    }
}

/// Parse a hymnal filename stem into (number, title).
pub fn parse_hymn_filename(stem: &str) -> (Option<u32>, String) {
    let caps = RE_HASH_FILENAME
        .captures(stem)
        .or_else(|| RE_DOT_FILENAME.captures(stem));
    if let Some(caps) = caps {
        let number = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let title = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
        return (number, title);
    }
    (None, stem.trim().to_string())
}

/// Split hymn text into verse and chorus sections.
///
/// A short stanza that occurs more than once is the chorus; every other
/// stanza is numbered as a verse.
pub fn parse_hymn_text(text: &str) -> Vec<Section> {
    let mut stanzas: Vec<(usize, String)> = Vec::new();
    let mut stanza: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !stanza.is_empty() {
                stanzas.push((stanza.len(), stanza.join("\n")));
                stanza.clear();
            }
        } else {
            stanza.push(line);
        }
    }
    if !stanza.is_empty() {
        stanzas.push((stanza.len(), stanza.join("\n")));
    }

    let is_chorus = |lines: usize, body: &str| {
        lines <= MAX_CHORUS_LINES && stanzas.iter().filter(|(_, b)| b == body).count() > 1
    };

    let mut verse_count = 0;
    stanzas
        .iter()
        .map(|(lines, body)| {
            if is_chorus(*lines, body) {
                Section::new("Chorus", body.as_str())
            } else {
                verse_count += 1;
                Section::new(format!("Verse {verse_count}"), body.as_str())
            }
        })
        .collect()
}

/// Parse one hymn file.
pub fn parse_hymn_file(path: &Path) -> Result<ParsedHymn> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::model("Songs", "HYMN_001", format!("No title in hymn file {}", path.display())))?;
    let (number, title) = parse_hymn_filename(stem);
    if title.is_empty() {
        return Err(Error::model("Songs", "HYMN_001", format!("No title in hymn file {}", path.display())));
    }

    let text = fs_err::read_to_string(path)?;
    let sections = parse_hymn_text(&text);
    if sections.is_empty() {
        return Err(Error::model(
            "Songs",
            "HYMN_002",
            format!("No stanzas in hymn file {}", path.display()),
        ));
    }

    debug!("Parsed hymn file {}: {title}", path.display());
    Ok(ParsedHymn { number, title, sections })
}

/// Import every `.txt` hymn in `dir`, skipping titles already present.
pub fn import_directory(songs: &mut SongRepository, dir: &Path) -> Result<ImportReport> {
    let mut entries: Vec<PathBuf> = fs_err::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("txt")))
        .collect();
    entries.sort();

    let mut report = ImportReport::default();
    for path in entries {
        let hymn = match parse_hymn_file(&path) {
            Ok(h) => h,
            Err(e) => {
                warn!("Skipping hymn file {}: {e}", path.display());
                report.skipped.push((path, e.to_string()));
                continue;
            }
        };
        if songs.get(&hymn.title).is_some() {
            report.skipped.push((path, format!("'{}' already exists", hymn.title)));
            continue;
        }
        let title = songs.add(hymn.into_draft())?.title.clone();
        report.imported.push(title);
    }

    info!(
        "Imported {} hymns from {} ({} skipped)",
        report.imported.len(),
        dir.display(),
        report.skipped.len()
    );
    Ok(report)
}
