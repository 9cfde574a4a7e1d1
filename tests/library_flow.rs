//! End-to-end flows through the content library and the display stage.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use sanctify::bible::{Bible, Book, Chapter, Verse};
use sanctify::library::Library;
use sanctify::media::NewMedia;
use sanctify::presentations::{PresentationDraft, Slide};
use sanctify::schedule::{Schedule, ScheduleItem};
use sanctify::services::content::{resolve, ContentRef};
use sanctify::settings::Settings;
use sanctify::songs::{Section, SongDraft};
use sanctify::stage::{DisplayContent, Stage};
use sanctify::types::{ContentKind, MediaCategory, SlideType};
use tempfile::TempDir;

fn open(dir: &TempDir) -> (Settings, Library) {
    let settings = Settings::open(dir.path().join("config/settings.json"), dir.path()).unwrap();
    let library = Library::open(&settings).unwrap();
    (settings, library)
}

fn john() -> Bible {
    Bible {
        name: "Test Version".into(),
        books: vec![Book {
            name: "John".into(),
            chapters: vec![Chapter {
                chapter: 3,
                verses: vec![
                    Verse { verse: 16, text: "For God so loved the world".into() },
                    Verse { verse: 17, text: "For God sent not his Son".into() },
                ],
            }],
        }],
    }
}

#[test]
fn test_song_goes_live_through_preview() {
    let dir = TempDir::new().unwrap();
    let (_settings, mut library) = open(&dir);
    library
        .songs
        .add(SongDraft {
            title: "Be Thou My Vision".into(),
            sections: vec![Section::new("Verse 1", "Be Thou my vision")],
            tags: "hymn, morning".into(),
        })
        .unwrap();

    let content = resolve(&library, &ContentRef::Song { title: "be thou my vision".into() }, None).unwrap();

    let mut stage = Stage::new();
    assert!(stage.go_live().is_err());
    stage.preview(content).unwrap();
    assert!(!stage.is_live());
    stage.go_live().unwrap();
    assert!(stage.is_live());
    assert_eq!(stage.live.content().as_text(), Some("Verse 1:\nBe Thou my vision"));
}

#[test]
fn test_library_reopens_with_saved_content() {
    let dir = TempDir::new().unwrap();
    {
        let (_settings, mut library) = open(&dir);
        library
            .songs
            .add(SongDraft { title: "Doxology".into(), sections: vec![], tags: String::new() })
            .unwrap();
        library.bibles.add("test", john()).unwrap();
    }

    let (_settings, library) = open(&dir);
    let summary = library.summary();
    assert_eq!(summary.songs, 1);
    assert_eq!(summary.bibles, 1);

    let passage = library.bibles.lookup("test", "Jn 3:16-17").unwrap();
    assert_eq!(passage.reference, "John 3:16-17");
    assert!(passage.text.starts_with("¹⁶For God so loved"));
}

#[test]
fn test_presentation_with_media_slide_resolves_to_media() {
    let dir = TempDir::new().unwrap();
    let (_settings, mut library) = open(&dir);

    let source = dir.path().join("cross.png");
    std::fs::write(&source, b"png").unwrap();
    let item = library.media.add(&source, MediaCategory::Images, NewMedia::default()).unwrap().clone();

    let id = library
        .create_presentation(PresentationDraft {
            name: "Welcome".into(),
            slides: vec![Slide::text("Good morning"), Slide(SlideType::Image, item.path.clone())],
            theme: None,
            tags: String::new(),
        })
        .unwrap()
        .id
        .clone();

    let slide = resolve(&library, &ContentRef::Presentation { id, slide: 1 }, None).unwrap();
    match slide {
        DisplayContent::Media { path, .. } => assert_eq!(path, library.media.absolute_path(&item)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_schedule_round_trip_resolves_items() {
    let dir = TempDir::new().unwrap();
    let (_settings, mut library) = open(&dir);
    library.bibles.add("test", john()).unwrap();
    library
        .songs
        .add(SongDraft {
            title: "Amazing Grace".into(),
            sections: vec![Section::new("Verse 1", "Amazing grace")],
            tags: String::new(),
        })
        .unwrap();

    let mut schedule = Schedule::new();
    schedule.add(ScheduleItem::new(ContentKind::Song, "Amazing Grace", "Amazing Grace"));
    schedule.add(ScheduleItem::scripture("test", "John 3:16"));
    schedule.add(ScheduleItem::new(ContentKind::Song, "Missing", "Missing"));
    let file = dir.path().join("service.json");
    schedule.export(&file).unwrap();

    let mut loaded = Schedule::new();
    assert_eq!(loaded.import(&file).unwrap(), 3);

    let resolved: Vec<bool> = loaded
        .items()
        .iter()
        .map(|item| item.content_ref().and_then(|r| resolve(&library, &r, None)).is_ok())
        .collect();
    assert_eq!(resolved, vec![true, true, false]);

    let scripture = resolve(&library, &loaded.items()[1].content_ref().unwrap(), None).unwrap();
    assert_eq!(scripture.as_text(), Some("¹⁶For God so loved the world\n\nJohn 3:16"));
}

#[test]
fn test_settings_paths_drive_library_locations() {
    let dir = TempDir::new().unwrap();
    let (mut settings, _library) = open(&dir);
    settings
        .set("paths", "songs", serde_json::json!("elsewhere/songs.json"))
        .unwrap();

    let mut library = Library::open(&settings).unwrap();
    library
        .songs
        .add(SongDraft { title: "Gloria".into(), sections: vec![], tags: String::new() })
        .unwrap();
    assert!(dir.path().join("elsewhere/songs.json").is_file());
}
