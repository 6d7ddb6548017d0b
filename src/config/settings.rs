//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data, and the persisted
//! defaults that seed a [`ServiceConfig`](super::ServiceConfig).

use super::StorageBackend;
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/scanward)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/scanward)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }

        let paths = Self::new()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    /// Initialize paths using XDG directories.
    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "scanward", "scanward")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        // Ensure directories exist
        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the local spec storage directory.
    pub fn specs_dir(&self) -> PathBuf {
        self.data_dir.join("specs")
    }
}

/// Persisted defaults, overridden by command-line flags and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Bucket holding scan specs.
    pub bucket: Option<String>,
    /// Storage backend for scan specs.
    pub backend: StorageBackend,
    /// Directory for the local backend.
    pub store_dir: Option<PathBuf>,
    /// ECR endpoint override.
    pub ecr_endpoint: Option<String>,
    /// Default log filter.
    pub log_level: String,
    /// Emit logs as JSON.
    pub json_logs: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bucket: None,
            backend: StorageBackend::S3,
            store_dir: None,
            ecr_endpoint: None,
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}
