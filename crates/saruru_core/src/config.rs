//! Application configuration for backend selection and file locations.
//!
//! Reads an optional TOML file (default `<config_dir>/saruru/config.toml`)
//! and lets callers layer explicit overrides on top.
//!
//! ```toml
//! backend = "table"          # or "local"
//! data_dir = "/var/lib/saruru"
//! log_level = "info"
//! ```

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const APP_DIR_NAME: &str = "saruru";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "saruru.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Which persistence backend drives the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Key-value blob in the data directory.
    #[default]
    Local,
    /// SQLite `goals` table in the data directory.
    Table,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Table => "table",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "table" | "remote" => Ok(Self::Table),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: Option<PathBuf>, source: toml::de::Error },
    InvalidBackend(String),
    MissingDataDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse config `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "failed to parse config: {source}"),
            Self::InvalidBackend(value) => {
                write!(f, "unsupported backend `{value}`; expected local|table")
            }
            Self::MissingDataDir => {
                write!(f, "no data directory configured and none could be detected")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidBackend(_) | Self::MissingDataDir => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    backend: Option<String>,
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
}

/// Explicit values that win over the config file, e.g. CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<BackendKind>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// `<config_dir>/saruru/config.toml`, when the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// `<data_dir>/saruru`, when the platform has a data dir.
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Loads configuration from `path`, or from the default location.
    ///
    /// An explicit `path` must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => Some(read_config_file(path)?),
            None => match Self::default_config_path() {
                Some(default_path) if default_path.is_file() => {
                    Some(read_config_file(&default_path)?)
                }
                _ => None,
            },
        };
        Self::resolve(file.unwrap_or_default(), overrides, Self::default_data_dir())
    }

    /// Parses TOML content without touching the file system.
    pub fn from_toml_str(raw: &str, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
        Self::resolve(file, overrides, Self::default_data_dir())
    }

    fn resolve(
        file: ConfigFile,
        overrides: ConfigOverrides,
        fallback_data_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let backend = match (overrides.backend, file.backend) {
            (Some(backend), _) => backend,
            (None, Some(raw)) => raw.parse()?,
            (None, None) => BackendKind::default(),
        };
        let data_dir = overrides
            .data_dir
            .or(file.data_dir)
            .or(fallback_data_dir)
            .ok_or(ConfigError::MissingDataDir)?;
        let log_level = overrides
            .log_level
            .or(file.log_level)
            .unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            backend,
            data_dir,
            log_level,
        })
    }

    /// Directory holding the local blob files.
    pub fn blob_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: Some(path.to_path_buf()),
        source,
    })
}
