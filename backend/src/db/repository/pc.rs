//! Workstation registry repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Pc, PcId, PcStatus};

/// Repository trait for the workstation registry.
#[async_trait]
pub trait PcRepository: Send + Sync {
    /// List every workstation, ordered by id.
    async fn list_pcs(&self) -> RepositoryResult<Vec<Pc>>;

    /// Fetch one workstation.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no workstation has this id
    async fn get_pc(&self, id: PcId) -> RepositoryResult<Pc>;

    /// Register a workstation.
    ///
    /// # Returns
    /// * `Ok(Pc)` - The stored workstation with its assigned id
    /// * `Err(RepositoryError::ValidationError)` - If its number is already taken
    async fn insert_pc(&self, pc: &Pc) -> RepositoryResult<Pc>;

    /// Register all of `pcs`, but only if the registry is empty.
    ///
    /// # Returns
    /// * `Ok(Some(Vec<Pc>))` - The stored workstations
    /// * `Ok(None)` - The registry already had entries and was left untouched
    async fn insert_pcs_if_empty(&self, pcs: &[Pc]) -> RepositoryResult<Option<Vec<Pc>>>;

    /// Change the status of a workstation.
    async fn update_pc_status(&self, id: PcId, status: PcStatus) -> RepositoryResult<Pc>;

    /// Remove a workstation from the registry.
    async fn delete_pc(&self, id: PcId) -> RepositoryResult<()>;
}
