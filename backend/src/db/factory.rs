//! Repository factory for dependency injection.
//!
//! Creates repository instances from runtime configuration: environment
//! variables or a `repository.toml` file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::{RepositoryConfig, DEFAULT_DATA_FILE};
use super::repositories::{FileRepository, LocalRepository};
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// In-memory repository persisted to a JSON file
    File,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "memory", "file", "json").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "file" | "json" => Ok(Self::File),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, defaults to File when `DATA_FILE`
    /// is set, otherwise Local.
    ///
    /// # Returns
    /// * `Err(RepositoryError::ConfigurationError)` - If `REPOSITORY_TYPE` names no known backend
    pub fn from_env() -> RepositoryResult<Self> {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().map_err(|e| {
                RepositoryError::configuration(format!("Invalid REPOSITORY_TYPE: {}", e))
            });
        }

        if std::env::var("DATA_FILE").is_ok() {
            Ok(Self::File)
        } else {
            Ok(Self::Local)
        }
    }
}

/// Data file path from `DATA_FILE`, or the default location.
pub fn data_file_from_env() -> PathBuf {
    std::env::var("DATA_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use cybercafe::db::{RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repo = RepositoryFactory::create(RepositoryType::File, Some("data/state.json".as_ref())).await?;
///     let local_repo = RepositoryFactory::create_local();
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `data_file` - Snapshot path (required for File)
    pub async fn create(
        repo_type: RepositoryType,
        data_file: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::File => {
                let path = data_file.ok_or_else(|| {
                    RepositoryError::configuration("File repository requires a data file path")
                })?;
                let repo = Self::create_file(path, false).await?;
                Ok(repo as Arc<dyn FullRepository>)
            }
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Open a file-backed repository.
    pub async fn create_file(
        path: impl AsRef<Path>,
        pretty: bool,
    ) -> RepositoryResult<Arc<FileRepository>> {
        let repo = FileRepository::open(path, pretty).await?;
        Ok(Arc::new(repo))
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` and `DATA_FILE`.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env()?;
        let data_file = data_file_from_env();
        Self::create(repo_type, Some(&data_file)).await
    }

    /// Create repository from a TOML configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from `config_path` when given, otherwise from the
    /// environment.
    ///
    /// Errors reading or interpreting the config file are returned as they
    /// are; the environment is only consulted when there is no file.
    pub async fn from_config_file_or_env(
        config_path: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match config_path {
            Some(path) => Self::from_config_file(path).await,
            None => Self::from_env().await,
        }
    }

    /// Create repository from the default configuration file location.
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from a RepositoryConfig instance.
    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::File => {
                let repo = Self::create_file(&config.file.path, config.file.pretty).await?;
                Ok(repo as Arc<dyn FullRepository>)
            }
        }
    }
}
