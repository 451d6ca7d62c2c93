//! Storage for usage sessions and the workstation registry.
//!
//! Access goes through the Repository pattern so backends can be swapped
//! without touching the HTTP layer or the analytics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP API (http/)                                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! │  - Upload checksum deduplication                         │
//! │  - Demand pipeline over stored sessions                  │
//! │  - Registry seeding, sessions, reservations              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Local Repository │     │ File Repository         │
//! │ (in-memory)      │     │ (JSON snapshot)         │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```no_run
//! use cybercafe::db::{services, RepositoryFactory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let pcs = services::seed_default_pcs(repo.as_ref()).await?;
//!     println!("{} PCs registered", pcs.len());
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


// ==================== Service Layer ====================

pub use services::{
    analyze_stored_usage, create_reservation, end_session, health_check, import_usage_batch,
    list_pcs, list_reservations, list_sessions, list_usage_records, pc_status_summary,
    seed_default_pcs, set_pc_status, start_session, store_usage_records,
    summarize_stored_usage, ImportReport,
};

// ==================== Repository Pattern Exports ====================

pub use checksum::calculate_checksum;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::{FileRepository, LocalRepository};
pub use repository::{
    ErrorContext, FullRepository, PcRepository, RepositoryError, RepositoryResult,
    ReservationRepository, SessionRepository, UsageRepository,
};

use anyhow::{Context, Result};
use log::info;
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository singleton.
///
/// Uses `repository.toml` when one is found in the standard locations,
/// otherwise the `REPOSITORY_TYPE` / `DATA_FILE` environment variables. A
/// config file that exists but is invalid is an error, never a silent
/// fallback to the environment.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let config_path = RepositoryConfig::find_default_location();
    match &config_path {
        Some(path) => info!("Using repository config {}", path.display()),
        None => info!("No repository.toml found, using environment"),
    }

    let repo = RepositoryFactory::from_config_file_or_env(config_path.as_deref())
        .await
        .context("Failed to create repository")?;

    // A concurrent initializer may have won; keep whichever landed first.
    Ok(REPOSITORY.get_or_init(|| repo))
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
