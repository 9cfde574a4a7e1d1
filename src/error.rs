//! Application error types.
//!
//! Every repository reports failures through the tagged [`Error::Model`]
//! variant, which carries the module that failed, a short code and a
//! human-readable message (`[Songs] ADD_002: ...`). IO and JSON failures keep
//! their path so the operator can tell which data file is at fault.

use std::path::PathBuf;
use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<PathBuf>,
    },

    /// JSON (de)serialization error with path context
    #[error("JSON error in {path:?}: {source}")]
    Json {
        /// The underlying serde error.
        source: serde_json::Error,
        /// File being read or written, if known.
        path: Option<PathBuf>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Tagged error raised by a content repository, the settings store or
    /// the display surfaces.
    #[error("[{module}] {code}: {message}")]
    Model {
        /// Component that raised the error (`Songs`, `Media`, `Settings`...).
        module: &'static str,
        /// Short machine-readable code such as `ADD_002`.
        code: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a JSON error with path context
    pub fn json(source: serde_json::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Json { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a tagged model error
    pub fn model(module: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self::Model {
            module,
            code,
            message: message.into(),
        }
    }

    /// Short code of a tagged error, `None` for other variants.
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Model { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Module of a tagged error, `None` for other variants.
    pub const fn module(&self) -> Option<&'static str> {
        match self {
            Self::Model { module, .. } => Some(*module),
            _ => None,
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}
