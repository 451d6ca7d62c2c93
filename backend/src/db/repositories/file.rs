//! JSON-file backed repository.
//!
//! Keeps the working set in a [`LocalRepository`] and rewrites a single JSON
//! snapshot on every mutation, so a restarted server picks up where the
//! previous one stopped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::local::{LocalData, LocalRepository};
use crate::db::models::{ImportBatch, ImportOutcome};
use crate::db::repository::*;
use crate::models::{
    EndedSession, Pc, PcId, PcStatus, Reservation, ReservationId, ReservationStatus, Session,
    SessionId, UsageRecord, UsageRecordId,
};
use crate::parsing::UploadFormat;

/// Repository persisting its state to a JSON file.
pub struct FileRepository {
    inner: LocalRepository,
    path: PathBuf,
    pretty: bool,
    // Held for the whole of every mutation; the data lock is only taken briefly inside.
    write_lock: Mutex<()>,
}

impl FileRepository {
    /// Open the snapshot at `path`, starting empty when it does not exist yet.
    pub async fn open(path: impl AsRef<Path>, pretty: bool) -> RepositoryResult<Self> {
        let path = path.as_ref().to_path_buf();

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let data: LocalData = serde_json::from_slice(&bytes).map_err(|e| {
                    RepositoryError::configuration(format!(
                        "Failed to parse data file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                info!("Loaded repository snapshot from {}", path.display());
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No data file at {}, starting with an empty repository",
                    path.display()
                );
                LocalData::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            inner: LocalRepository::from_data(data),
            path,
            pretty,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a copy of the state, write that copy to disk and only
    /// then make it the live state.
    ///
    /// A failed write leaves both the file and the in-memory state as they
    /// were before the call.
    async fn commit<T>(
        &self,
        operation: &str,
        op: impl FnOnce(&mut LocalData) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let _guard = self.write_lock.lock().await;
        self.inner.check_health()?;

        let mut candidate = self.inner.snapshot();
        let value = op(&mut candidate)?;

        if let Err(e) = self.write_snapshot(&candidate).await {
            warn!(
                "Discarding {} after failed write to {}: {}",
                operation,
                self.path.display(),
                e
            );
            return Err(e.with_operation(operation));
        }

        self.inner.replace(candidate);
        Ok(value)
    }

    /// Serialize `snapshot` to a sibling temp file and rename it over the
    /// target, so a crash mid-write leaves the previous snapshot intact.
    async fn write_snapshot(&self, snapshot: &LocalData) -> RepositoryResult<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(snapshot)?
        } else {
            serde_json::to_vec(snapshot)?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl UsageRepository for FileRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn list_usage_records(&self) -> RepositoryResult<Vec<UsageRecord>> {
        self.inner.list_usage_records().await
    }

    async fn get_usage_record(&self, id: UsageRecordId) -> RepositoryResult<UsageRecord> {
        self.inner.get_usage_record(id).await
    }

    async fn insert_usage_records(
        &self,
        records: &[UsageRecord],
    ) -> RepositoryResult<Vec<UsageRecordId>> {
        self.commit("insert_usage_records", |data| {
            Ok(data.insert_usage_records(records))
        })
        .await
    }

    async fn update_usage_record(
        &self,
        id: UsageRecordId,
        record: &UsageRecord,
    ) -> RepositoryResult<UsageRecord> {
        self.commit("update_usage_record", |data| {
            data.update_usage_record(id, record)
        })
        .await
    }

    async fn delete_usage_record(&self, id: UsageRecordId) -> RepositoryResult<()> {
        self.commit("delete_usage_record", |data| data.delete_usage_record(id))
            .await
    }

    async fn find_import_by_checksum(
        &self,
        checksum: &str,
    ) -> RepositoryResult<Option<ImportBatch>> {
        self.inner.find_import_by_checksum(checksum).await
    }

    async fn insert_import(
        &self,
        checksum: &str,
        format: UploadFormat,
        records: &[UsageRecord],
    ) -> RepositoryResult<ImportOutcome> {
        self.commit("insert_import", |data| {
            Ok(data.insert_import(checksum, format, records))
        })
        .await
    }
}

#[async_trait]
impl PcRepository for FileRepository {
    async fn list_pcs(&self) -> RepositoryResult<Vec<Pc>> {
        self.inner.list_pcs().await
    }

    async fn get_pc(&self, id: PcId) -> RepositoryResult<Pc> {
        self.inner.get_pc(id).await
    }

    async fn insert_pc(&self, pc: &Pc) -> RepositoryResult<Pc> {
        self.commit("insert_pc", |data| data.insert_pc(pc)).await
    }

    async fn insert_pcs_if_empty(&self, pcs: &[Pc]) -> RepositoryResult<Option<Vec<Pc>>> {
        self.commit("insert_pcs_if_empty", |data| data.insert_pcs_if_empty(pcs))
            .await
    }

    async fn update_pc_status(&self, id: PcId, status: PcStatus) -> RepositoryResult<Pc> {
        self.commit("update_pc_status", |data| data.update_pc_status(id, status))
            .await
    }

    async fn delete_pc(&self, id: PcId) -> RepositoryResult<()> {
        self.commit("delete_pc", |data| data.delete_pc(id)).await
    }
}

#[async_trait]
impl SessionRepository for FileRepository {
    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>> {
        self.inner.list_sessions().await
    }

    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session> {
        self.inner.get_session(id).await
    }

    async fn start_session(&self, session: &Session) -> RepositoryResult<Session> {
        self.commit("start_session", |data| data.start_session(session))
            .await
    }

    async fn end_session(
        &self,
        id: SessionId,
        ended_at: DateTime<Utc>,
    ) -> RepositoryResult<EndedSession> {
        self.commit("end_session", |data| data.end_session(id, ended_at))
            .await
    }
}

#[async_trait]
impl ReservationRepository for FileRepository {
    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.inner.list_reservations().await
    }

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        self.inner.get_reservation(id).await
    }

    async fn insert_reservation(
        &self,
        reservation: &Reservation,
    ) -> RepositoryResult<Reservation> {
        self.commit("insert_reservation", |data| {
            data.insert_reservation(reservation)
        })
        .await
    }

    async fn update_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        self.commit("update_reservation_status", |data| {
            data.update_reservation_status(id, status)
        })
        .await
    }

    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<()> {
        self.commit("delete_reservation", |data| data.delete_reservation(id))
            .await
    }
}
