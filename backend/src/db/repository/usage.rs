//! Usage-record repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{ImportBatch, ImportOutcome};
use crate::models::{UsageRecord, UsageRecordId};
use crate::parsing::UploadFormat;

/// Repository trait for stored usage sessions.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across threads.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the backing store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Usage Records ====================

    /// List every stored record, ordered by id.
    async fn list_usage_records(&self) -> RepositoryResult<Vec<UsageRecord>>;

    /// Fetch one record.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no record has this id
    async fn get_usage_record(&self, id: UsageRecordId) -> RepositoryResult<UsageRecord>;

    /// Store a batch of records, ignoring any id they carry.
    ///
    /// # Returns
    /// * `Ok(Vec<UsageRecordId>)` - Assigned ids, in input order
    async fn insert_usage_records(
        &self,
        records: &[UsageRecord],
    ) -> RepositoryResult<Vec<UsageRecordId>>;

    /// Replace the record stored under `id`.
    ///
    /// # Returns
    /// * `Ok(UsageRecord)` - The stored record, with its id set
    /// * `Err(RepositoryError::NotFound)` - If no record has this id
    async fn update_usage_record(
        &self,
        id: UsageRecordId,
        record: &UsageRecord,
    ) -> RepositoryResult<UsageRecord>;

    /// Delete one record.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no record has this id
    async fn delete_usage_record(&self, id: UsageRecordId) -> RepositoryResult<()>;

    // ==================== Imports ====================

    /// Find an earlier import of a payload with the given checksum.
    async fn find_import_by_checksum(&self, checksum: &str)
        -> RepositoryResult<Option<ImportBatch>>;

    /// Store the records of an uploaded payload unless its checksum is known.
    ///
    /// The checksum lookup and the insert are one atomic step: of several
    /// concurrent imports of the same payload exactly one stores records and
    /// the others get [`ImportOutcome::Duplicate`].
    async fn insert_import(
        &self,
        checksum: &str,
        format: UploadFormat,
        records: &[UsageRecord],
    ) -> RepositoryResult<ImportOutcome>;
}
