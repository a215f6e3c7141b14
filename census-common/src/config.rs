//! Configuration loading and root folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: the service logs a
//! warning and starts on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder (database location)
pub const ROOT_FOLDER_ENV: &str = "CENSUS_ROOT_FOLDER";

/// Environment variable naming the directory tree watched for deposited files
pub const WATCH_ROOT_ENV: &str = "CENSUS_WATCH_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "census.db";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5780";

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// TOML configuration file contents
///
/// All keys are optional; absent keys fall back to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the SQLite database
    pub root_folder: Option<PathBuf>,
    /// Directory tree polled for externally deposited census files
    pub watch_root: Option<PathBuf>,
    /// HTTP listen address, e.g. "0.0.0.0:5780"
    pub bind_address: Option<String>,
    /// Seconds between directory polls
    pub poll_interval_secs: Option<u64>,
    /// Capacity of the detected-file queue between poller and worker
    pub queue_capacity: Option<usize>,
    /// Ingest files already present when the watcher starts
    pub process_existing: Option<bool>,
    /// Canonical field names forming the deduplication key
    ///
    /// Absent means whole-record equality.
    pub dedup_key: Option<Vec<String>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse TOML config from a string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load TOML config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load the platform config file, falling back to defaults
    ///
    /// Never fails: a missing file is expected on fresh installs and a
    /// malformed one is reported and ignored.
    pub fn load_or_default() -> Self {
        match config_file_path() {
            Ok(path) => match Self::load_from(&path) {
                Ok(config) => {
                    debug!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                debug!("No config file in use: {}", e);
                Self::default()
            }
        }
    }
}

/// Root folder resolution
///
/// CLI argument → `CENSUS_ROOT_FOLDER` → TOML `root_folder` → platform default.
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Watch root resolution
///
/// CLI argument → `CENSUS_WATCH_ROOT` → TOML `watch_root`. `None` disables
/// the directory watcher.
pub fn resolve_watch_root(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(WATCH_ROOT_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    toml_config.watch_root.clone()
}

/// Path of the SQLite database inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        debug!("Created root folder: {}", root_folder.display());
    } else if !root_folder.is_dir() {
        return Err(Error::Config(format!(
            "Root folder is not a directory: {}",
            root_folder.display()
        )));
    }
    Ok(())
}

/// Get the platform configuration file path
fn config_file_path() -> Result<PathBuf> {
    // ~/.config/census/config.toml first, then /etc/census/config.toml
    let user_config = dirs::config_dir().map(|d| d.join("census").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/census/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("census"))
        .unwrap_or_else(|| PathBuf::from("./census_data"))
}
