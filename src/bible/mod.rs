//! Bible repository, verse lookup and scripture reference parsing.
//!
//! Each bible is one JSON file in the bibles directory; the file stem is the
//! bible id. The nested `books → chapters → verses` structure is validated on
//! load and on add.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::store;

const MODULE: &str = "Scriptures";

/// One verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Verse number, starting at 1.
    pub verse: u32,
    /// Verse text.
    pub text: String,
}

/// One chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number, starting at 1.
    pub chapter: u32,
    /// Verses of the chapter.
    pub verses: Vec<Verse>,
}

/// One book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Book name, e.g. `Genesis`.
    pub name: String,
    /// Chapters of the book.
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Chapter by number.
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.chapter == number)
    }
}

/// A complete bible translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bible {
    /// Display name, e.g. `King James Version`.
    pub name: String,
    /// Books of the bible.
    pub books: Vec<Book>,
}

impl Bible {
    fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && self.books.iter().all(|b| {
                !b.name.trim().is_empty()
                    && b.chapters.iter().all(|c| {
                        c.chapter > 0 && c.verses.iter().all(|v| v.verse > 0 && !v.text.trim().is_empty())
                    })
            })
    }

    /// Book by name, ignoring case. When no book carries the name as written,
    /// aliases such as `Ps` or `1cor` match books stored under any name of
    /// the same canonical book.
    pub fn book(&self, name: &str) -> Option<&Book> {
        let wanted = name.trim().to_lowercase();
        self.books.iter().find(|b| b.name.to_lowercase() == wanted).or_else(|| {
            let canonical = normalize_book_name(name)?;
            self.books
                .iter()
                .find(|b| normalize_book_name(&b.name).unwrap_or(b.name.as_str()) == canonical)
        })
    }
}

/// Id and name of a loaded bible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibleSummary {
    /// Bible id (file stem).
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A verse found by [`BibleRepository::search`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseHit {
    /// Book name.
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// Verse text.
    pub text: String,
}

/// The verses of a scripture reference, ready for projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// Canonical reference, e.g. `John 3:16-17`.
    pub reference: String,
    /// Verses in the range, in order.
    pub verses: Vec<Verse>,
    /// Verse texts joined with superscript verse numbers.
    pub text: String,
}

/// All bibles of the bibles directory.
#[derive(Debug)]
pub struct BibleRepository {
    root: PathBuf,
    bibles: BTreeMap<String, Bible>,
}

fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.starts_with('.') && !id.contains(['/', '\\'])
}

impl BibleRepository {
    /// Create the directory if needed and load every `*.json` bible in it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs_err::create_dir_all(&root).map_err(|e| {
            Error::model(MODULE, "DIR_001", format!("Error creating bibles directory: {e}"))
        })?;
        debug!("Ensured bibles directory {}", root.display());

        let mut bibles = BTreeMap::new();
        for entry in WalkDir::new(&root).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::model(MODULE, "LOAD_001", format!("Error scanning bibles directory {}: {e}", root.display()))
            })?;
            let path = entry.path();
            let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if !entry.file_type().is_file() || !is_json {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            let content = fs_err::read_to_string(path).map_err(|e| {
                Error::model(MODULE, "LOAD_003", format!("Error loading bible from {}: {e}", path.display()))
            })?;
            let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
                Error::model(MODULE, "LOAD_002", format!("Error decoding JSON from {}: {e}", path.display()))
            })?;
            match serde_json::from_value::<Bible>(value) {
                Ok(bible) if bible.is_valid() => {
                    bibles.insert(id, bible);
                }
                Ok(bible) => warn!("Invalid bible data skipped: {} ({id})", bible.name),
                Err(e) => warn!("Invalid bible data skipped: {id} ({e})"),
            }
        }

        info!("Loaded {} bibles from {}", bibles.len(), root.display());
        Ok(Self { root, bibles })
    }

    /// Bibles directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of loaded bibles.
    pub fn len(&self) -> usize {
        self.bibles.len()
    }

    /// Whether no bible is loaded.
    pub fn is_empty(&self) -> bool {
        self.bibles.is_empty()
    }

    /// Id and name of every bible, sorted by name.
    pub fn all(&self) -> Vec<BibleSummary> {
        let mut all: Vec<BibleSummary> = self
            .bibles
            .iter()
            .map(|(id, b)| BibleSummary { id: id.clone(), name: b.name.clone() })
            .collect();
        all.sort_by_cached_key(|b| b.name.to_lowercase());
        all
    }

    /// Bible by id.
    pub fn get(&self, id: &str) -> Option<&Bible> {
        self.bibles.get(id)
    }

    fn require(&self, id: &str, code: &'static str) -> Result<&Bible> {
        self.get(id)
            .ok_or_else(|| Error::model(MODULE, code, format!("Bible not found: {id}")))
    }

    /// Book names of a bible, sorted.
    pub fn books(&self, id: &str) -> Result<Vec<&str>> {
        let bible = self.require(id, "GET_BOOKS_001")?;
        let mut names: Vec<&str> = bible.books.iter().map(|b| b.name.as_str()).collect();
        names.sort_by_cached_key(|n| n.to_lowercase());
        Ok(names)
    }

    /// Chapter numbers of a book, sorted.
    pub fn chapters(&self, id: &str, book: &str) -> Result<Vec<u32>> {
        let bible = self.require(id, "GET_CHAPTERS_001")?;
        let book = bible
            .book(book)
            .ok_or_else(|| Error::model(MODULE, "GET_CHAPTERS_002", format!("Book not found: {book}")))?;
        let mut chapters: Vec<u32> = book.chapters.iter().map(|c| c.chapter).collect();
        chapters.sort_unstable();
        Ok(chapters)
    }

    /// Verses of a chapter, sorted by number.
    pub fn verses(&self, id: &str, book: &str, chapter: u32) -> Result<Vec<&Verse>> {
        let bible = self.require(id, "GET_VERSES_001")?;
        let found = bible
            .book(book)
            .ok_or_else(|| Error::model(MODULE, "GET_VERSES_002", format!("Book not found: {book}")))?;
        let chapter = found
            .chapter(chapter)
            .ok_or_else(|| Error::model(MODULE, "GET_VERSES_003", format!("Chapter not found: {chapter}")))?;
        let mut verses: Vec<&Verse> = chapter.verses.iter().collect();
        verses.sort_by_key(|v| v.verse);
        Ok(verses)
    }

    /// Verses whose text contains `query`, ignoring case.
    pub fn search(&self, id: &str, query: &str) -> Result<Vec<VerseHit>> {
        let bible = self.require(id, "SEARCH_001")?;
        let query = query.trim().trim_matches('"').trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for book in &bible.books {
            for chapter in &book.chapters {
                for verse in &chapter.verses {
                    if verse.text.to_lowercase().contains(&query) {
                        hits.push(VerseHit {
                            book: book.name.clone(),
                            chapter: chapter.chapter,
                            verse: verse.verse,
                            text: verse.text.clone(),
                        });
                    }
                }
            }
        }
        hits.sort_by(|a, b| {
            (a.book.to_lowercase(), a.chapter, a.verse).cmp(&(b.book.to_lowercase(), b.chapter, b.verse))
        });
        Ok(hits)
    }

    /// Store a new bible as `<root>/<id>.json`.
    pub fn add(&mut self, id: &str, bible: Bible) -> Result<()> {
        if self.bibles.contains_key(id) {
            return Err(Error::model(MODULE, "ADD_001", format!("Bible already exists: {id}")));
        }
        if !is_valid_id(id) || !bible.is_valid() {
            return Err(Error::model(MODULE, "ADD_002", format!("Invalid bible data for {}", bible.name)));
        }

        let path = self.root.join(format!("{id}.json"));
        store::write_json(&path, &bible).map_err(|e| {
            Error::model(MODULE, "ADD_003", format!("Error saving bible {id} to {}: {e}", path.display()))
        })?;
        info!("Added bible: {} ({id})", bible.name);
        self.bibles.insert(id.to_string(), bible);
        Ok(())
    }

    /// Remove a bible and its file.
    pub fn delete(&mut self, id: &str) -> Result<Bible> {
        if !self.bibles.contains_key(id) {
            return Err(Error::model(MODULE, "DELETE_001", format!("Bible not found: {id}")));
        }
        let path = self.root.join(format!("{id}.json"));
        fs_err::remove_file(&path).map_err(|e| {
            Error::model(MODULE, "DELETE_002", format!("Error deleting bible file {}: {e}", path.display()))
        })?;
        let removed = self
            .bibles
            .remove(id)
            .ok_or_else(|| Error::model(MODULE, "DELETE_001", format!("Bible not found: {id}")))?;
        info!("Deleted bible: {} ({id})", removed.name);
        Ok(removed)
    }

    /// Verses of a reference plus their projection text.
    pub fn passage(&self, id: &str, reference: &ScriptureRef) -> Result<Passage> {
        let bible = self.require(id, "PASSAGE_001")?;
        let book = bible.book(&reference.book).ok_or_else(|| {
            Error::model(MODULE, "PASSAGE_002", format!("Book not found: {}", reference.book))
        })?;
        let chapter = book.chapter(reference.chapter).ok_or_else(|| {
            Error::model(
                MODULE,
                "PASSAGE_003",
                format!("Chapter {} not found in {}", reference.chapter, book.name),
            )
        })?;

        let mut verses: Vec<Verse> = chapter
            .verses
            .iter()
            .filter(|v| reference.verses.contains(v.verse))
            .cloned()
            .collect();
        verses.sort_by_key(|v| v.verse);
        if verses.is_empty() {
            return Err(Error::model(MODULE, "PASSAGE_004", format!("No verses found for {reference}")));
        }

        let text = verses
            .iter()
            .map(|v| {
                let clean: Vec<&str> = v.text.split_whitespace().collect();
                format!("{}{}", to_superscript(v.verse), clean.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" ");
        let canonical = ScriptureRef { book: book.name.clone(), ..reference.clone() };
        Ok(Passage { reference: canonical.to_string(), verses, text })
    }

    /// Parse `reference` and look it up.
    pub fn lookup(&self, id: &str, reference: &str) -> Result<Passage> {
        let parsed = parse_scripture_ref(reference).ok_or_else(|| {
            Error::model(MODULE, "REF_001", format!("Invalid scripture reference: {reference}"))
        })?;
        self.passage(id, &parsed)
    }
}

/// Verses selected by a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseRange {
    /// The whole chapter (`Psalm 23`).
    Whole,
    /// One verse (`John 3:16`).
    Single(u32),
    /// Inclusive range (`John 3:16-18`).
    Range(u32, u32),
}

impl VerseRange {
    /// Whether `verse` falls in the range.
    pub fn contains(self, verse: u32) -> bool {
        match self {
            Self::Whole => true,
            Self::Single(v) => verse == v,
            Self::Range(start, end) => (start..=end).contains(&verse),
        }
    }
}

/// A parsed scripture reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptureRef {
    /// Canonical book name, or the name as written when unknown.
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Selected verses.
    pub verses: VerseRange,
}

impl fmt::Display for ScriptureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verses {
            VerseRange::Whole => write!(f, "{} {}", self.book, self.chapter),
            VerseRange::Single(v) => write!(f, "{} {}:{v}", self.book, self.chapter),
            VerseRange::Range(a, b) => write!(f, "{} {}:{a}-{b}", self.book, self.chapter),
        }
    }
}

/// Canonical book names with their accepted abbreviations.
const BOOKS: &[(&str, &[&str])] = &[
    ("Genesis", &["gen", "gn"]),
    ("Exodus", &["ex", "exod"]),
    ("Leviticus", &["lev", "lv"]),
    ("Numbers", &["num", "nm"]),
    ("Deuteronomy", &["deut", "dt"]),
    ("Joshua", &["josh"]),
    ("Judges", &["judg", "jdg"]),
    ("Ruth", &["rth"]),
    ("1 Samuel", &["1 sam", "1sam", "1 sm"]),
    ("2 Samuel", &["2 sam", "2sam", "2 sm"]),
    ("1 Kings", &["1 kgs", "1kings", "1kgs"]),
    ("2 Kings", &["2 kgs", "2kings", "2kgs"]),
    ("1 Chronicles", &["1 chr", "1chr", "1 chron"]),
    ("2 Chronicles", &["2 chr", "2chr", "2 chron"]),
    ("Ezra", &["ezr"]),
    ("Nehemiah", &["neh"]),
    ("Esther", &["esth", "est"]),
    ("Job", &["jb"]),
    ("Psalms", &["ps", "psa", "psalm", "pss"]),
    ("Proverbs", &["prov", "prv"]),
    ("Ecclesiastes", &["eccl", "eccles", "qoh"]),
    ("Song of Solomon", &["song", "song of songs", "sos", "canticles"]),
    ("Isaiah", &["isa", "is"]),
    ("Jeremiah", &["jer"]),
    ("Lamentations", &["lam"]),
    ("Ezekiel", &["ezek", "ezk"]),
    ("Daniel", &["dan", "dn"]),
    ("Hosea", &["hos"]),
    ("Joel", &["jl"]),
    ("Amos", &["am"]),
    ("Obadiah", &["obad", "ob"]),
    ("Jonah", &["jon"]),
    ("Micah", &["mic"]),
    ("Nahum", &["nah"]),
    ("Habakkuk", &["hab"]),
    ("Zephaniah", &["zeph"]),
    ("Haggai", &["hag"]),
    ("Zechariah", &["zech"]),
    ("Malachi", &["mal"]),
    ("Matthew", &["matt", "mt"]),
    ("Mark", &["mk", "mrk"]),
    ("Luke", &["lk", "luk"]),
    ("John", &["jn", "jhn"]),
    ("Acts", &["act"]),
    ("Romans", &["rom", "rm"]),
    ("1 Corinthians", &["1 cor", "1cor"]),
    ("2 Corinthians", &["2 cor", "2cor"]),
    ("Galatians", &["gal"]),
    ("Ephesians", &["eph"]),
    ("Philippians", &["phil", "php"]),
    ("Colossians", &["col"]),
    ("1 Thessalonians", &["1 thess", "1thess", "1 thes"]),
    ("2 Thessalonians", &["2 thess", "2thess", "2 thes"]),
    ("1 Timothy", &["1 tim", "1tim"]),
    ("2 Timothy", &["2 tim", "2tim"]),
    ("Titus", &["tit"]),
    ("Philemon", &["philem", "phlm"]),
    ("Hebrews", &["heb"]),
    ("James", &["jas", "jms"]),
    ("1 Peter", &["1 pet", "1pet", "1 pt"]),
    ("2 Peter", &["2 pet", "2pet", "2 pt"]),
    ("1 John", &["1john", "1 jn"]),
    ("2 John", &["2john", "2 jn"]),
    ("3 John", &["3john", "3 jn"]),
    ("Jude", &["jud"]),
    ("Revelation", &["rev", "revelations", "apocalypse"]),
];

lazy_static! {
    /// Lowercase alias (and canonical name) to canonical book name.
    static ref BOOK_ALIASES: HashMap<String, &'static str> = {
        let mut m = HashMap::new();
        for (canonical, aliases) in BOOKS {
            m.insert(canonical.to_lowercase(), *canonical);
            for alias in *aliases {
                m.insert((*alias).to_string(), *canonical);
            }
        }
        m
    };
}

/// Version suffixes stripped from references such as `John 3:16 KJV`.
const VERSION_SUFFIXES: &[&str] = &["NRSVue", "NRSVUE", "NRSV", "NIV", "KJV", "ESV", "NASB", "NLT"];

const SUPERSCRIPT_DIGITS: &[char] = &['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Render a number with Unicode superscript digits.
pub fn to_superscript(n: u32) -> String {
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| SUPERSCRIPT_DIGITS[d as usize])
        .collect()
}

/// Canonical name for a book name or abbreviation.
pub fn normalize_book_name(name: &str) -> Option<&'static str> {
    let lower = name.trim().trim_end_matches('.').to_lowercase();
    if let Some(&canonical) = BOOK_ALIASES.get(&lower) {
        return Some(canonical);
    }
    let no_space = lower.replace(' ', "");
    BOOK_ALIASES.get(&no_space).copied()
}

fn strip_label(text: &str) -> &str {
    let mut text = text.trim();
    for prefix in ["Scripture Reading:", "Scripture:", "Reading:"] {
        text = text.trim_start_matches(prefix).trim();
    }
    text
}

fn clean_reference(part: &str) -> Option<&str> {
    let mut cleaned = part.trim().split('(').next()?.trim();
    for suffix in VERSION_SUFFIXES {
        cleaned = cleaned.trim_end_matches(suffix).trim();
    }
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse the first reference of a string like `"Isaiah 32:15-17; Luke 1:76"`.
pub fn parse_scripture_ref(text: &str) -> Option<ScriptureRef> {
    let text = strip_label(text);
    let first = text.split([';', ',']).next()?;
    parse_single_reference(clean_reference(first)?)
}

/// Parse every reference of a `;`/`,` separated list, skipping bad ones.
pub fn parse_scripture_refs(text: &str) -> Vec<ScriptureRef> {
    strip_label(text)
        .split([';', ','])
        .filter_map(clean_reference)
        .filter_map(parse_single_reference)
        .collect()
}

/// Parse one reference such as `1 John 3:1-3`, `Luke 2v1-20` or `Psalm 23`.
fn parse_single_reference(text: &str) -> Option<ScriptureRef> {
    let (book_part, verse_part) = text.trim().rsplit_once(char::is_whitespace)?;
    let book_part = book_part.trim();
    if book_part.is_empty() {
        return None;
    }
    let verse_part = verse_part.replace(['v', 'V'], ":");

    let (chapter, verses) = match verse_part.split_once(':') {
        Some((chapter, range)) => {
            let verses = match range.split_once(['-', '–']) {
                Some((start, end)) => {
                    let start: u32 = start.trim().parse().ok()?;
                    let end: u32 = end.trim().parse().ok()?;
                    if start == 0 || end < start {
                        return None;
                    }
                    if start == end {
                        VerseRange::Single(start)
                    } else {
                        VerseRange::Range(start, end)
                    }
                }
                None => VerseRange::Single(range.trim().parse().ok().filter(|v| *v > 0)?),
            };
            (chapter, verses)
        }
        None => (verse_part.as_str(), VerseRange::Whole),
    };
    let chapter: u32 = chapter.trim().parse().ok().filter(|c| *c > 0)?;

    let book = normalize_book_name(book_part).map_or_else(|| book_part.to_string(), String::from);
    Some(ScriptureRef { book, chapter, verses })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use tempfile::TempDir;

    fn verse(n: u32, text: &str) -> Verse {
        Verse { verse: n, text: text.to_string() }
    }

    fn sample() -> Bible {
        Bible {
            name: "Sample Version".into(),
            books: vec![
                Book {
                    name: "John".into(),
                    chapters: vec![Chapter {
                        chapter: 3,
                        verses: vec![
                            verse(17, "For God sent not his Son into the world to condemn the world."),
                            verse(16, "For God so loved the world,  that he gave his only Son."),
                        ],
                    }],
                },
                Book {
                    name: "Genesis".into(),
                    chapters: vec![
                        Chapter { chapter: 2, verses: vec![verse(1, "Thus the heavens were finished.")] },
                        Chapter { chapter: 1, verses: vec![verse(1, "In the beginning God created the world.")] },
                    ],
                },
            ],
        }
    }

    fn repo_with_sample(dir: &TempDir) -> BibleRepository {
        let mut repo = BibleRepository::open(dir.path().join("bibles")).unwrap();
        repo.add("sample", sample()).unwrap();
        repo
    }

    #[test]
    fn test_parse_simple_ref() {
        let r = parse_scripture_ref("Isaiah 32:15-17").unwrap();
        assert_eq!(r.book, "Isaiah");
        assert_eq!(r.chapter, 32);
        assert_eq!(r.verses, VerseRange::Range(15, 17));
    }

    #[test]
    fn test_parse_numbered_book_and_alias() {
        let r = parse_scripture_ref("1 John 3:1-3").unwrap();
        assert_eq!(r.book, "1 John");
        assert_eq!(parse_scripture_ref("1cor 13:4").unwrap().book, "1 Corinthians");
        assert_eq!(parse_scripture_ref("Ps 23:1").unwrap().book, "Psalms");
    }

    #[test]
    fn test_parse_with_version_and_prefix() {
        let r = parse_scripture_ref("Scripture: Luke 1:76-79 (NRSV)").unwrap();
        assert_eq!(r.book, "Luke");
        assert_eq!(r.verses, VerseRange::Range(76, 79));

        let r = parse_scripture_ref("John 3:16 KJV").unwrap();
        assert_eq!(r.verses, VerseRange::Single(16));
    }

    #[test]
    fn test_parse_v_notation_keeps_book_name() {
        let r = parse_scripture_ref("Revelation 21v1-4").unwrap();
        assert_eq!(r.book, "Revelation");
        assert_eq!(r.chapter, 21);
        assert_eq!(r.verses, VerseRange::Range(1, 4));
    }

    #[test]
    fn test_parse_whole_chapter_and_unknown_book() {
        let r = parse_scripture_ref("Psalm 23").unwrap();
        assert_eq!(r.to_string(), "Psalms 23");
        assert_eq!(r.verses, VerseRange::Whole);

        let r = parse_scripture_ref("Wisdom 3:1").unwrap();
        assert_eq!(r.book, "Wisdom");

        assert!(parse_scripture_ref("John").is_none());
        assert!(parse_scripture_ref("John 3:5-2").is_none());
    }

    #[test]
    fn test_parse_multiple_refs() {
        let refs = parse_scripture_refs("Isaiah 32:15-17; Luke 1:76-79 NRSVue (Hope)");
        let shown: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["Isaiah 32:15-17", "Luke 1:76-79"]);
    }

    #[test]
    fn test_superscript() {
        assert_eq!(to_superscript(15), "¹⁵");
        assert_eq!(to_superscript(1), "¹");
        assert_eq!(to_superscript(100), "¹⁰⁰");
    }

    #[test]
    fn test_add_reload_and_browse() {
        let dir = TempDir::new().unwrap();
        repo_with_sample(&dir);
        let repo = BibleRepository::open(dir.path().join("bibles")).unwrap();

        assert_eq!(repo.all(), vec![BibleSummary { id: "sample".into(), name: "Sample Version".into() }]);
        assert_eq!(repo.books("sample").unwrap(), vec!["Genesis", "John"]);
        assert_eq!(repo.chapters("sample", "genesis").unwrap(), vec![1, 2]);
        let verses: Vec<u32> = repo.verses("sample", "John", 3).unwrap().iter().map(|v| v.verse).collect();
        assert_eq!(verses, vec![16, 17]);

        assert_eq!(repo.books("missing").unwrap_err().code(), Some("GET_BOOKS_001"));
        assert_eq!(repo.chapters("sample", "Mark").unwrap_err().code(), Some("GET_CHAPTERS_002"));
        assert_eq!(repo.verses("sample", "John", 9).unwrap_err().code(), Some("GET_VERSES_003"));
    }

    #[test]
    fn test_add_rejections_and_delete() {
        let dir = TempDir::new().unwrap();
        let mut repo = repo_with_sample(&dir);

        assert_eq!(repo.add("sample", sample()).unwrap_err().code(), Some("ADD_001"));
        let mut bad = sample();
        bad.books[0].chapters[0].verses.push(verse(0, "zero"));
        assert_eq!(repo.add("bad", bad).unwrap_err().code(), Some("ADD_002"));
        assert_eq!(repo.add("../escape", sample()).unwrap_err().code(), Some("ADD_002"));

        repo.delete("sample").unwrap();
        assert!(repo.is_empty());
        assert!(!dir.path().join("bibles/sample.json").exists());
        assert_eq!(repo.delete("sample").unwrap_err().code(), Some("DELETE_001"));
    }

    #[test]
    fn test_load_skips_invalid_and_rejects_undecodable() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("bibles");
        repo_with_sample(&dir);
        fs_err::write(root.join("empty.json"), r#"{"name": "", "books": []}"#).unwrap();
        fs_err::write(root.join("notes.txt"), "ignored").unwrap();

        let repo = BibleRepository::open(&root).unwrap();
        assert_eq!(repo.len(), 1);

        fs_err::write(root.join("broken.json"), "{").unwrap();
        let err = BibleRepository::open(&root).unwrap_err();
        assert_eq!(err.code(), Some("LOAD_002"));
    }

    #[test]
    fn test_search() {
        let dir = TempDir::new().unwrap();
        let repo = repo_with_sample(&dir);

        let hits = repo.search("sample", "WORLD").unwrap();
        let refs: Vec<(String, u32, u32)> = hits.into_iter().map(|h| (h.book, h.chapter, h.verse)).collect();
        assert_eq!(
            refs,
            vec![("Genesis".into(), 1, 1), ("John".into(), 3, 16), ("John".into(), 3, 17)]
        );
        assert_eq!(repo.search("sample", "\"so loved\"").unwrap().len(), 1);
        assert!(repo.search("sample", "  ").unwrap().is_empty());
        assert_eq!(repo.search("nope", "x").unwrap_err().code(), Some("SEARCH_001"));
    }

    #[test]
    fn test_passage() {
        let dir = TempDir::new().unwrap();
        let repo = repo_with_sample(&dir);

        let passage = repo.lookup("sample", "jn 3:16-17").unwrap();
        assert_eq!(passage.reference, "John 3:16-17");
        assert_eq!(passage.verses.len(), 2);
        assert!(passage.text.starts_with("¹⁶For God so loved the world, that"));
        assert!(passage.text.contains(" ¹⁷For God sent"));

        assert_eq!(repo.lookup("sample", "John 3:40").unwrap_err().code(), Some("PASSAGE_004"));
        assert_eq!(repo.lookup("sample", "Mark 1:1").unwrap_err().code(), Some("PASSAGE_002"));
        assert_eq!(repo.lookup("sample", "nonsense").unwrap_err().code(), Some("REF_001"));
    }

    #[test]
    fn test_book_stored_under_alias_name() {
        let dir = TempDir::new().unwrap();
        let mut repo = BibleRepository::open(dir.path().join("bibles")).unwrap();
        let bible = Bible {
            name: "Alias Version".into(),
            books: vec![Book {
                name: "Psalm".into(),
                chapters: vec![Chapter { chapter: 23, verses: vec![verse(1, "The Lord is my shepherd.")] }],
            }],
        };
        repo.add("alias", bible).unwrap();

        assert_eq!(repo.books("alias").unwrap(), vec!["Psalm"]);
        assert_eq!(repo.chapters("alias", "Psalm").unwrap(), vec![23]);
        assert_eq!(repo.chapters("alias", "psalm").unwrap(), vec![23]);
        assert_eq!(repo.verses("alias", "Psalm", 23).unwrap().len(), 1);

        let passage = repo.lookup("alias", "Ps 23:1").unwrap();
        assert_eq!(passage.reference, "Psalm 23:1");
        assert_eq!(repo.chapters("alias", "Psalms").unwrap(), vec![23]);
    }
}
