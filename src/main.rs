//! `Sanctify` command line: manage the content library and render content
//! the way the live output would show it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sanctify::config::Config;
use sanctify::constants::layout;
use sanctify::library::Library;
use sanctify::media::NewMedia;
use sanctify::schedule::Schedule;
use sanctify::services::content::{self, ContentRef};
use sanctify::settings::Settings;
use sanctify::songs::{hymn, SearchMode};
use sanctify::stage::Stage;
use sanctify::types::{MediaCategory, MediaId, PresentationId, Scaling, ThemeContext};

#[derive(Parser, Debug)]
#[command(name = "sanctify", version, about = "Live presentation for church services")]
struct Cli {
    /// Data root directory (overrides SANCTIFY_HOME)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the data root and record counts
    Status,
    /// Manage songs
    #[command(subcommand)]
    Songs(SongsCommand),
    /// Manage media files
    #[command(subcommand)]
    Media(MediaCommand),
    /// List themes
    Themes {
        /// Only themes for this context
        #[arg(long)]
        context: Option<ThemeContext>,
    },
    /// Manage presentations
    #[command(subcommand)]
    Presentations(PresentationsCommand),
    /// Browse bibles
    #[command(subcommand)]
    Bibles(BiblesCommand),
    /// Read and change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Resolve every item of a schedule file
    Schedule {
        /// Schedule JSON file
        file: PathBuf,
    },
    /// Send content through preview to the live output and print it
    Render {
        #[command(subcommand)]
        target: RenderTarget,
        /// Theme name to style text with
        #[arg(long, global = true)]
        theme: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SongsCommand {
    /// List all songs
    List,
    /// Search songs
    Search {
        query: String,
        /// title, lyrics, tags or fuzzy
        #[arg(long, default_value = "title")]
        mode: SearchMode,
        /// Only songs with a tag containing this text
        #[arg(long, default_value = "")]
        tag: String,
    },
    /// Print a song's lyrics
    Show { title: String },
    /// Delete a song
    Delete { title: String },
    /// Copy a song under a new title
    Duplicate { title: String },
    /// Import plain-text hymn files (defaults to SANCTIFY_HYMNAL)
    ImportHymns { dir: Option<PathBuf> },
}

#[derive(Subcommand, Debug)]
enum MediaCommand {
    /// List media items
    List {
        #[arg(long)]
        category: Option<MediaCategory>,
    },
    /// Copy a file into the media library
    Add {
        file: PathBuf,
        /// Inferred from the file extension when absent
        #[arg(long)]
        category: Option<MediaCategory>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value = "fit")]
        scaling: Scaling,
    },
    /// Delete a media item and its file
    Delete { id: String },
    /// Mark an image as the logo
    SetLogo { id: String },
}

#[derive(Subcommand, Debug)]
enum PresentationsCommand {
    /// List presentations
    List,
    /// Write a presentation to a JSON file
    Export { id: String, file: PathBuf },
    /// Add a presentation from a JSON file
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum BiblesCommand {
    /// List installed bibles
    List,
    /// Print a passage, e.g. "John 3:16-18"
    Lookup { bible: String, reference: String },
    /// Find verses containing text
    Search { bible: String, query: String },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print one setting, or everything
    Get { section: Option<String>, key: Option<String> },
    /// Change a setting; the value is parsed as JSON, else taken as text
    Set { section: String, key: String, value: String },
    /// Restore the defaults
    Reset,
    /// Write the settings to a file
    Export { file: PathBuf },
    /// Replace the settings from a file
    Import { file: PathBuf },
    /// Report which content paths exist
    CheckPaths,
}

#[derive(Subcommand, Debug)]
enum RenderTarget {
    /// A song by title
    Song { title: String },
    /// A media item by id
    Media { id: String },
    /// One slide of a presentation
    Presentation {
        id: String,
        #[arg(long, default_value_t = 0)]
        slide: usize,
    },
    /// A scripture passage
    Scripture { bible: String, reference: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(root) = cli.root {
        config.data_root = root;
    }

    init_logging(&config)?;
    info!("Starting {} {} at {}", config.app_name(), config.app_version(), config.data_root.display());

    let mut settings = Settings::open(config.settings_file(), &config.data_root)
        .context("Failed to open settings")?;

    match cli.command {
        Command::Settings(command) => run_settings(&mut settings, command),
        command => {
            let mut library = Library::open(&settings).context("Failed to open library")?;
            run(&config, &mut library, command)
        }
    }
}

/// Log to stderr and to `<root>/logs/sanctify.log`.
///
/// `RUST_LOG` wins over the configured `advanced.log_level`.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(configured_level(&config.settings_file())));

    let log_dir = config.log_dir();
    fs_err::create_dir_all(&log_dir)?;
    let log_file = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(layout::LOG_FILE))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

/// Log level from the settings file, read before logging is up.
fn configured_level(settings_file: &Path) -> String {
    let level = fs_err::read_to_string(settings_file)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .and_then(|v| v["advanced"]["log_level"].as_str().map(str::to_uppercase))
        .unwrap_or_else(|| "INFO".to_string());
    match level.as_str() {
        "WARNING" => "warn".to_string(),
        other => other.to_lowercase(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(config: &Config, library: &mut Library, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            println!("Data root: {}", config.data_root.display());
            print_json(&library.summary())
        }
        Command::Songs(command) => run_songs(config, library, command),
        Command::Media(command) => run_media(library, command),
        Command::Themes { context } => print_json(&library.themes.all(context)),
        Command::Presentations(command) => run_presentations(library, command),
        Command::Bibles(command) => run_bibles(library, command),
        Command::Schedule { file } => run_schedule(library, &file),
        Command::Render { target, theme } => render(library, target, theme.as_deref()),
        Command::Settings(_) => Ok(()),
    }
}

fn run_songs(config: &Config, library: &mut Library, command: SongsCommand) -> Result<()> {
    let songs = &mut library.songs;
    match command {
        SongsCommand::List => {
            for song in songs.all() {
                println!("{}  [{}]", song.title, song.tags);
            }
        }
        SongsCommand::Search { query, mode, tag } => {
            for song in songs.search(&query, mode, &tag) {
                println!("{}", song.title);
            }
        }
        SongsCommand::Show { title } => {
            let Some(song) = songs.get(&title) else {
                bail!("Song not found: {title}");
            };
            println!("{}\n\n{}", song.title, song.render_text());
        }
        SongsCommand::Delete { title } => {
            let song = songs.delete(&title)?;
            println!("Deleted {}", song.title);
        }
        SongsCommand::Duplicate { title } => {
            let song = songs.duplicate(&title)?;
            println!("Created {}", song.title);
        }
        SongsCommand::ImportHymns { dir } => {
            let Some(dir) = dir.or_else(|| config.hymnal_path.clone()) else {
                bail!("No hymn directory given and SANCTIFY_HYMNAL is not set");
            };
            let report = hymn::import_directory(songs, &dir)?;
            println!("{report}");
        }
    }
    Ok(())
}

fn run_media(library: &mut Library, command: MediaCommand) -> Result<()> {
    let media = &mut library.media;
    match command {
        MediaCommand::List { category } => print_json(&media.all(category)),
        MediaCommand::Add { file, category, name, tags, scaling } => {
            let category = match category {
                Some(c) => c,
                None => file
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(MediaCategory::from_extension)
                    .with_context(|| format!("Cannot infer a media category for {}", file.display()))?,
            };
            let item = media.add(&file, category, NewMedia { display_name: name, tags, scaling })?;
            println!("Added {} ({})", item.name, item.id);
            Ok(())
        }
        MediaCommand::Delete { id } => {
            let item = media.delete(&MediaId::new(id))?;
            println!("Deleted {}", item.name);
            Ok(())
        }
        MediaCommand::SetLogo { id } => {
            let item = media.set_logo(&MediaId::new(id))?;
            println!("Logo is now {}", item.name);
            Ok(())
        }
    }
}

fn run_presentations(library: &mut Library, command: PresentationsCommand) -> Result<()> {
    match command {
        PresentationsCommand::List => {
            for p in library.presentations.all() {
                println!("{}  {} ({} slides)", p.id, p.name, p.slides.len());
            }
        }
        PresentationsCommand::Export { id, file } => {
            library.presentations.export(&PresentationId::new(id), &file)?;
            println!("Exported to {}", file.display());
        }
        PresentationsCommand::Import { file } => {
            let p = library.import_presentation(&file)?;
            println!("Imported {} ({})", p.name, p.id);
        }
    }
    Ok(())
}

fn run_bibles(library: &Library, command: BiblesCommand) -> Result<()> {
    let bibles = &library.bibles;
    match command {
        BiblesCommand::List => print_json(&bibles.all()),
        BiblesCommand::Lookup { bible, reference } => {
            let passage = bibles.lookup(&bible, &reference)?;
            println!("{}\n\n{}", passage.reference, passage.text);
            Ok(())
        }
        BiblesCommand::Search { bible, query } => print_json(&bibles.search(&bible, &query)?),
    }
}

fn run_settings(settings: &mut Settings, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Get { section: None, .. } => print_json(settings.all())?,
        SettingsCommand::Get { section: Some(section), key: None } => {
            print_json(&settings.all().get(&section))?;
        }
        SettingsCommand::Get { section: Some(section), key: Some(key) } => {
            print_json(&settings.get(&section, &key))?;
        }
        SettingsCommand::Set { section, key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            settings.set(&section, &key, value)?;
            if settings.restart_required() {
                println!("Restart the application to apply this change");
            }
        }
        SettingsCommand::Reset => settings.reset()?,
        SettingsCommand::Export { file } => settings.export(&file)?,
        SettingsCommand::Import { file } => settings.import(&file)?,
        SettingsCommand::CheckPaths => print_json(&settings.validate_paths())?,
    }
    Ok(())
}

fn run_schedule(library: &Library, file: &Path) -> Result<()> {
    let mut schedule = Schedule::new();
    let count = schedule.import(file)?;
    info!("Loaded {count} schedule items from {}", file.display());

    for (index, item) in schedule.items().iter().enumerate() {
        let status = item
            .content_ref()
            .and_then(|r| content::resolve(library, &r, None))
            .map_or_else(|e| format!("unavailable: {e}"), |_| "ready".to_string());
        println!("{:>3}. [{}] {}  {status}", index + 1, item.kind.name(), item.title);
    }
    Ok(())
}

fn render(library: &Library, target: RenderTarget, theme: Option<&str>) -> Result<()> {
    let theme = match theme {
        Some(name) => {
            let found = library.themes.find_by_name(name);
            if found.is_none() {
                warn!("Theme not found: {name}");
            }
            found
        }
        None => None,
    };
    let reference = match target {
        RenderTarget::Song { title } => ContentRef::Song { title },
        RenderTarget::Media { id } => ContentRef::Media { id: MediaId::new(id) },
        RenderTarget::Presentation { id, slide } => ContentRef::Presentation { id: PresentationId::new(id), slide },
        RenderTarget::Scripture { bible, reference } => ContentRef::Scripture { bible, reference },
    };

    let mut stage = Stage::new();
    stage.preview(content::resolve(library, &reference, theme)?)?;
    stage.go_live()?;
    print_json(stage.live.content())
}
