//! Application configuration.
//!
//! Resolves the data root from the environment (and a `.env` file). Everything
//! else is configured through the settings file below that root.

use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{env as env_vars, layout};

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Directory holding settings, content and logs
    pub data_root: PathBuf,
    /// Directory of plain-text hymn files offered for import
    pub hymnal_path: Option<PathBuf>,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Configuration rooted at an explicit directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: root.into(),
            ..Self::default()
        }
    }

    /// Settings file below the data root.
    pub fn settings_file(&self) -> PathBuf {
        self.data_root.join(layout::SETTINGS_FILE)
    }

    /// Log directory below the data root.
    pub fn log_dir(&self) -> PathBuf {
        self.data_root.join(layout::LOG_DIR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            data_root: default_root(),
            hymnal_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Ok(root) = env::var(env_vars::HOME_VAR) {
            if !root.trim().is_empty() {
                config.data_root = expand(&root);
            }
        }

        config.hymnal_path = env::var(env_vars::HYMNAL_VAR)
            .ok()
            .map(|path| expand(&path))
            .filter(|p| p.is_dir());

        config
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).to_string())
}

/// Platform data directory, or `./data` when there is none.
fn default_root() -> PathBuf {
    dirs::data_dir().map_or_else(
        || Path::new(layout::FALLBACK_ROOT).to_path_buf(),
        |d| d.join(layout::APP_DIR),
    )
}
