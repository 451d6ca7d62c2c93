//! Repository configuration file support.
//!
//! Reads the storage backend selection from a `repository.toml` file:
//!
//! ```toml
//! [repository]
//! type = "file"
//!
//! [file]
//! path = "data/cybercafe.json"
//! pretty = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Default location of the JSON snapshot for the file backend.
pub const DEFAULT_DATA_FILE: &str = "data/cybercafe.json";

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub file: FileSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// JSON snapshot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default = "default_data_file")]
    pub path: PathBuf,
    #[serde(default)]
    pub pretty: bool,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            path: default_data_file(),
            pretty: false,
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Path of the first `repository.toml` found in the standard locations:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn find_default_location() -> Option<PathBuf> {
        [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load repository configuration from the default location.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        match Self::find_default_location() {
            Some(path) => Self::from_file(path),
            None => Err(RepositoryError::configuration(
                "No repository.toml found in standard locations",
            )),
        }
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }
}
