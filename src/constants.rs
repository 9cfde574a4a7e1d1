//! Application constants.
//!
//! Centralizes magic numbers and fixed names so the repositories and the
//! display surfaces agree on them.

/// Environment variables read at startup.
pub mod env {
    /// Overrides the data root directory (`~` is expanded).
    pub const HOME_VAR: &str = "SANCTIFY_HOME";

    /// Directory of hymn text files offered by `songs import-hymns`.
    pub const HYMNAL_VAR: &str = "SANCTIFY_HYMNAL";
}

/// File layout below the data root.
pub mod layout {
    /// Directory name used under the platform data directory.
    pub const APP_DIR: &str = "sanctify";

    /// Fallback data root when the platform has no data directory.
    pub const FALLBACK_ROOT: &str = "data";

    /// Settings file, relative to the data root.
    pub const SETTINGS_FILE: &str = "config/settings.json";

    /// Log directory, relative to the data root.
    pub const LOG_DIR: &str = "logs";

    /// Log file name inside the log directory.
    pub const LOG_FILE: &str = "sanctify.log";
}

/// Naming conventions shared by the repositories.
pub mod naming {
    /// Suffix appended to the name of a duplicated record.
    pub const COPY_SUFFIX: &str = " (Copy)";

    /// Theme id assigned to presentations created without one.
    pub const DEFAULT_THEME_ID: &str = "default";

    /// Tag given to songs imported from hymn text files.
    pub const HYMN_TAG: &str = "hymn";
}

/// Live output and preview constants.
pub mod display {
    /// Smallest zoom level, in percent.
    pub const ZOOM_MIN_PERCENT: u16 = 50;

    /// Largest zoom level, in percent.
    pub const ZOOM_MAX_PERCENT: u16 = 200;

    /// Zoom step for zoom in/out, in percent.
    pub const ZOOM_STEP_PERCENT: u16 = 10;

    /// Zoom level after a clear.
    pub const ZOOM_DEFAULT_PERCENT: u16 = 100;

    /// Default text color on the display surfaces.
    pub const DEFAULT_FONT_COLOR: &str = "#ecf0f1";

    /// Default background color on the display surfaces.
    pub const DEFAULT_BACKGROUND_COLOR: &str = "#2c3e50";

    /// Default font size in points.
    pub const DEFAULT_FONT_SIZE: u32 = 18;

    /// Default font family.
    pub const DEFAULT_FONT_FAMILY: &str = "Arial";

    /// Emergency alert background.
    pub const ALERT_BACKGROUND_COLOR: &str = "#e74c3c";

    /// Emergency alert font size.
    pub const ALERT_FONT_SIZE: u32 = 24;

    /// Default emergency alert text.
    pub const ALERT_TEXT: &str = "Emergency Alert: Please stand by.";
}

/// Search constants.
pub mod search {
    /// Minimum skim score for a fuzzy title match.
    pub const MIN_FUZZY_SCORE: i64 = 50;

    /// Longest stanza (in lines) that may be taken as a hymn chorus.
    pub const MAX_CHORUS_LINES: usize = 6;
}
