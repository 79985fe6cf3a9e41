//! Runtime configuration loaded from the environment.
//!
//! | Variable           | Meaning                       | Default                          |
//! |--------------------|-------------------------------|----------------------------------|
//! | `ENLIST_DB_PATH`   | SQLite database file          | `<temp dir>/todolist.sqlite3`    |
//! | `ENLIST_LOG_LEVEL` | trace/debug/info/warn/error   | `debug` (debug) / `info` (release) |
//! | `ENLIST_LOG_DIR`   | absolute directory for logs   | unset: file logging disabled     |
//!
//! Blank values count as unset.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_VAR: &str = "ENLIST_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ENLIST_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ENLIST_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "todolist.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Loads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level)?,
            None => default_log_level(),
        };
        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(dir) = log_dir.as_deref() {
            ensure_absolute(dir)?;
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

/// Default log level for the current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Maps a case-insensitive level name to its canonical form.
pub fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(ConfigError::UnsupportedLogLevel(other.to_string())),
    }
}

pub(crate) fn ensure_absolute(path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativeLogDir(path.to_path_buf()))
    }
}
