//! Application settings stored as a nested JSON object.
//!
//! The file is merged over the built-in defaults on load, every known key is
//! validated (invalid values fall back to their default), and the result is
//! written back. Each change is saved immediately and reported to registered
//! listeners.

use lazy_static::lazy_static;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::stage::Playback;
use crate::store;

const MODULE: &str = "Settings";

const STARTUP_SCREENS: &[&str] = &["Songs", "Scriptures", "Media", "Presentations", "Themes"];
const LANGUAGES: &[&str] = &["English", "Spanish", "French", "German"];
const UI_THEMES: &[&str] = &["Light", "Dark"];
const LOG_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR"];

/// Path keys that name files; the other path keys name directories.
const FILE_PATH_KEYS: &[&str] = &["songs", "media_metadata", "presentations", "themes"];

lazy_static! {
    static ref DEFAULTS: Value =
        json!({
            "general": {
                "startup_screen": "Songs",
                "language": "English",
                "enable_tips": true,
                "fullscreen_on_startup": false,
                "window_geometry": {"width": 1280, "height": 720, "x": 100, "y": 100}
            },
            "appearance": {
                "theme": "Light",
                "ui_font": "Arial,12",
                "enable_animations": true
            },
            "paths": {
                "songs": "songs/songs.json",
                "media": "media",
                "media_metadata": "media/media.json",
                "presentations": "presentations/presentations.json",
                "themes": "themes/themes.json",
                "bibles": "bibles"
            },
            "behavior": {
                "auto_save_interval": 300,
                "confirm_before_delete": true,
                "default_playback_speed": 1.0,
                "loop_media": false
            },
            "advanced": {
                "developer_mode": false,
                "log_level": "INFO"
            },
            "accessibility": {
                "high_contrast": false
            }
        });
}

/// The built-in default settings.
pub fn defaults() -> &'static Value {
    &DEFAULTS
}

fn default_object() -> Map<String, Value> {
    DEFAULTS.as_object().cloned().unwrap_or_default()
}

fn default_value(section: &str, key: &str) -> Option<&'static Value> {
    DEFAULTS.get(section).and_then(|s| s.get(key))
}

fn one_of(value: &Value, choices: &[&str]) -> bool {
    value.as_str().is_some_and(|s| choices.contains(&s))
}

/// Whether `value` is acceptable for `section.key`. Keys without a rule
/// accept anything.
pub fn is_valid_value(section: &str, key: &str, value: &Value) -> bool {
    match (section, key) {
        ("general", "startup_screen") => one_of(value, STARTUP_SCREENS),
        ("general", "language") => one_of(value, LANGUAGES),
        ("appearance", "theme") => one_of(value, UI_THEMES),
        ("appearance", "ui_font") => value.is_string(),
        ("behavior", "auto_save_interval") => value
            .as_i64()
            .is_some_and(|v| (60..=3600).contains(&v)),
        ("behavior", "default_playback_speed") => value
            .as_f64()
            .is_some_and(|v| (0.5..=2.0).contains(&v)),
        ("advanced", "log_level") => value
            .as_str()
            .is_some_and(|s| LOG_LEVELS.contains(&s.to_uppercase().as_str())),
        ("paths", _) => value.is_string(),
        _ => match default_value(section, key) {
            Some(Value::Bool(_)) => value.is_boolean(),
            _ => true,
        },
    }
}

/// Recursively merge `loaded` over `defaults`: nested objects merge key by
/// key, anything else replaces the default.
pub fn merge(defaults: &Map<String, Value>, loaded: &Map<String, Value>) -> Map<String, Value> {
    let mut result = defaults.clone();
    for (key, value) in loaded {
        match (result.get(key), value) {
            (Some(Value::Object(base)), Value::Object(over)) => {
                let merged = merge(base, over);
                result.insert(key.clone(), Value::Object(merged));
            }
            _ => {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    result
}

/// A saved change, as passed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    /// Section name, e.g. `behavior`.
    pub section: String,
    /// Key within the section.
    pub key: String,
    /// New value.
    pub value: Value,
}

type Listener = Box<dyn FnMut(&SettingChange) + Send>;

/// Resolved content locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Songs JSON file.
    pub songs: PathBuf,
    /// Managed media directory.
    pub media: PathBuf,
    /// Media metadata JSON file.
    pub media_metadata: PathBuf,
    /// Presentations JSON file.
    pub presentations: PathBuf,
    /// Themes JSON file.
    pub themes: PathBuf,
    /// Bibles directory.
    pub bibles: PathBuf,
}

/// The settings store.
pub struct Settings {
    path: PathBuf,
    root: PathBuf,
    values: Map<String, Value>,
    restart_required: bool,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("path", &self.path)
            .field("root", &self.root)
            .field("values", &self.values)
            .field("restart_required", &self.restart_required)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Settings {
    /// Load the settings file at `path`, creating it from defaults when
    /// missing or corrupted. Relative content paths resolve against `root`.
    pub fn open(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let root = root.into();
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(dir).map_err(|e| {
                Error::model(MODULE, "DIR_001", format!("Error creating config directory: {e}"))
            })?;
            debug!("Ensured config directory {}", dir.display());
        }

        let mut settings = Self {
            path,
            root,
            values: default_object(),
            restart_required: false,
            listeners: Vec::new(),
        };

        if settings.path.exists() {
            let content = fs_err::read_to_string(&settings.path).map_err(|e| {
                Error::model(
                    MODULE,
                    "LOAD_001",
                    format!("Error loading settings from {}: {e}", settings.path.display()),
                )
            })?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(loaded)) => {
                    settings.values = merge(&default_object(), &loaded);
                    settings.validate();
                }
                Ok(_) => error!("Corrupted settings file {}: not an object", settings.path.display()),
                Err(e) => error!("Corrupted settings file {}: {e}", settings.path.display()),
            }
        }
        settings.save()?;
        info!("Settings loaded from {}", settings.path.display());
        Ok(settings)
    }

    /// Settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data root that relative paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn save(&self) -> Result<()> {
        store::write_json(&self.path, &self.values).map_err(|e| {
            Error::model(
                MODULE,
                "SAVE_001",
                format!("Error saving settings to {}: {e}", self.path.display()),
            )
        })?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Reset invalid values (or whole non-object sections) to defaults.
    fn validate(&mut self) {
        let Some(default_sections) = DEFAULTS.as_object() else {
            return;
        };
        for (section, default_keys) in default_sections {
            let Some(keys) = self.values.get_mut(section).and_then(Value::as_object_mut) else {
                warn!("Invalid settings section {section}, resetting to default");
                self.values.insert(section.clone(), default_keys.clone());
                continue;
            };
            let invalid: Vec<String> = keys
                .iter()
                .filter(|(key, value)| !is_valid_value(section, key, value))
                .map(|(key, _)| key.clone())
                .collect();
            for key in invalid {
                warn!("Invalid {section}.{key}: {}, resetting to default", keys[&key]);
                match default_value(section, &key) {
                    Some(default) => keys.insert(key, default.clone()),
                    None => keys.remove(&key),
                };
            }
        }
    }

    /// Value of `section.key`, falling back to the built-in default.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.values
            .get(section)
            .and_then(|s| s.get(key))
            .or_else(|| default_value(section, key))
    }

    /// String value.
    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).and_then(Value::as_str)
    }

    /// Boolean value.
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.get(section, key).and_then(Value::as_bool)
    }

    /// Integer value.
    pub fn get_i64(&self, section: &str, key: &str) -> Option<i64> {
        self.get(section, key).and_then(Value::as_i64)
    }

    /// Numeric value.
    pub fn get_f64(&self, section: &str, key: &str) -> Option<f64> {
        self.get(section, key).and_then(Value::as_f64)
    }

    /// All settings.
    pub fn all(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Register a change listener.
    pub fn on_change(&mut self, listener: impl FnMut(&SettingChange) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, section: &str, key: &str, value: &Value) {
        let change = SettingChange {
            section: section.to_string(),
            key: key.to_string(),
            value: value.clone(),
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    fn notify_all(&mut self) {
        let entries: Vec<(String, String, Value)> = self
            .values
            .iter()
            .filter_map(|(section, keys)| keys.as_object().map(|k| (section, k)))
            .flat_map(|(section, keys)| {
                keys.iter()
                    .map(move |(key, value)| (section.clone(), key.clone(), value.clone()))
            })
            .collect();
        for (section, key, value) in entries {
            self.notify(&section, &key, &value);
        }
    }

    /// Validate, store and save one value, then notify listeners.
    pub fn set(&mut self, section: &str, key: &str, value: Value) -> Result<()> {
        if !is_valid_value(section, key, &value) {
            return Err(Error::model(
                MODULE,
                "SET_001",
                format!("Invalid value for {section}.{key}: {value}"),
            ));
        }

        let entry = self
            .values
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(keys) = entry.as_object_mut() else {
            return Err(Error::model(MODULE, "SET_001", format!("Settings section {section} is not an object")));
        };
        keys.insert(key.to_string(), value.clone());

        let mut also_changed = None;
        match (section, key) {
            ("appearance", "theme" | "ui_font") => self.restart_required = true,
            ("advanced", "developer_mode") => {
                let level = Value::from(if value.as_bool().unwrap_or(false) { "DEBUG" } else { "INFO" });
                keys.insert("log_level".to_string(), level.clone());
                also_changed = Some(level);
            }
            _ => {}
        }

        self.save()?;
        info!("Set {section}.{key} = {value}");
        self.notify(section, key, &value);
        if let Some(level) = also_changed {
            self.notify("advanced", "log_level", &level);
        }
        Ok(())
    }

    /// Restore every default.
    pub fn reset(&mut self) -> Result<()> {
        self.values = default_object();
        self.save()?;
        self.restart_required = true;
        info!("Settings reset to defaults");
        self.notify_all();
        Ok(())
    }

    /// Write the current settings to another file.
    pub fn export(&self, path: &Path) -> Result<()> {
        store::write_json(path, &self.values).map_err(|e| {
            Error::model(
                MODULE,
                "EXPORT_001",
                format!("Error exporting settings to {}: {e}", path.display()),
            )
        })?;
        info!("Settings exported to {}", path.display());
        Ok(())
    }

    /// Replace the settings with a previously exported file.
    pub fn import(&mut self, path: &Path) -> Result<()> {
        let content = fs_err::read_to_string(path).map_err(|e| {
            Error::model(
                MODULE,
                "IMPORT_002",
                format!("Error importing settings from {}: {e}", path.display()),
            )
        })?;
        let loaded = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(Error::model(
                    MODULE,
                    "IMPORT_001",
                    format!("Settings in {} are not an object", path.display()),
                ))
            }
            Err(e) => {
                return Err(Error::model(
                    MODULE,
                    "IMPORT_001",
                    format!("Corrupted JSON in {}: {e}", path.display()),
                ))
            }
        };

        self.values = merge(&default_object(), &loaded);
        self.validate();
        self.save()?;
        self.restart_required = true;
        info!("Settings imported from {}", path.display());
        self.notify_all();
        Ok(())
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(raw).to_string());
        if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        }
    }

    fn path_setting(&self, key: &str) -> PathBuf {
        let raw = self
            .get_str("paths", key)
            .or_else(|| default_value("paths", key).and_then(Value::as_str))
            .unwrap_or_default();
        self.resolve(raw)
    }

    /// Content locations, resolved against the data root.
    pub fn paths(&self) -> DataPaths {
        DataPaths {
            songs: self.path_setting("songs"),
            media: self.path_setting("media"),
            media_metadata: self.path_setting("media_metadata"),
            presentations: self.path_setting("presentations"),
            themes: self.path_setting("themes"),
            bibles: self.path_setting("bibles"),
        }
    }

    /// Check that file paths are readable files and directory paths are
    /// readable directories.
    pub fn validate_paths(&self) -> BTreeMap<String, bool> {
        let mut results = BTreeMap::new();
        let Some(paths) = self.values.get("paths").and_then(Value::as_object) else {
            return results;
        };
        for (key, raw) in paths {
            let ok = match raw.as_str() {
                Some(raw) => {
                    let path = self.resolve(raw);
                    if FILE_PATH_KEYS.contains(&key.as_str()) {
                        path.is_file() && fs_err::File::open(&path).is_ok()
                    } else {
                        path.is_dir() && fs_err::read_dir(&path).is_ok()
                    }
                }
                None => false,
            };
            if !ok {
                warn!("Invalid path for {key}: {raw}");
            }
            results.insert(key.clone(), ok);
        }
        results
    }

    /// Media playback options from the behavior section.
    pub fn playback(&self) -> Playback {
        Playback {
            looping: self.get_bool("behavior", "loop_media").unwrap_or(false),
            speed: self.get_f64("behavior", "default_playback_speed").unwrap_or(1.0),
        }
    }

    /// Configured log level, e.g. `INFO`.
    pub fn log_level(&self) -> &str {
        self.get_str("advanced", "log_level").unwrap_or("INFO")
    }

    /// Whether a change needs an application restart to apply.
    pub fn restart_required(&self) -> bool {
        self.restart_required
    }

    /// Acknowledge the restart flag.
    pub fn clear_restart_required(&mut self) {
        self.restart_required = false;
    }
}
