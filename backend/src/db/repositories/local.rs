//! In-memory local repository implementation.
//!
//! Stores everything in ordered maps behind a single lock, giving fast,
//! deterministic and isolated behavior for unit tests and local development.
//! The same state doubles as the snapshot format of the file repository.
//!
//! Every operation is a synchronous method on [`LocalData`] run under one
//! lock guard, so checks and the writes that depend on them cannot interleave
//! with another caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::db::models::{ImportBatch, ImportOutcome};
use crate::db::repository::*;
use crate::models::{
    EndedSession, Pc, PcId, PcStatus, Reservation, ReservationId, ReservationStatus, Session,
    SessionId, SessionStatus, UsageRecord, UsageRecordId,
};
use crate::parsing::UploadFormat;

/// In-memory local repository.
///
/// # Example
/// ```
/// use cybercafe::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.usage_record_count(), 0);
/// assert_eq!(repo.pc_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

fn default_healthy() -> bool {
    true
}

fn first_id() -> i64 {
    1
}

/// Complete repository state; serialized as-is by the file repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LocalData {
    #[serde(default)]
    usage_records: BTreeMap<i64, UsageRecord>,
    #[serde(default)]
    pcs: BTreeMap<i64, Pc>,
    #[serde(default)]
    imports: HashMap<String, ImportBatch>,
    #[serde(default)]
    sessions: BTreeMap<i64, Session>,
    #[serde(default)]
    reservations: BTreeMap<i64, Reservation>,

    // ID counters
    #[serde(default = "first_id")]
    next_usage_id: i64,
    #[serde(default = "first_id")]
    next_pc_id: i64,
    #[serde(default = "first_id")]
    next_session_id: i64,
    #[serde(default = "first_id")]
    next_reservation_id: i64,

    // Connection health
    #[serde(skip, default = "default_healthy")]
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            usage_records: BTreeMap::new(),
            pcs: BTreeMap::new(),
            imports: HashMap::new(),
            sessions: BTreeMap::new(),
            reservations: BTreeMap::new(),
            next_usage_id: 1,
            next_pc_id: 1,
            next_session_id: 1,
            next_reservation_id: 1,
            is_healthy: true,
        }
    }
}

fn not_found(operation: &str, entity: &str, label: &str, id: impl ToString) -> RepositoryError {
    let id = id.to_string();
    RepositoryError::not_found_with_context(
        format!("{} {} not found", label, id),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

fn rejected(operation: &str, entity: &str, message: String) -> RepositoryError {
    RepositoryError::validation_with_context(
        message,
        ErrorContext::new(operation).with_entity(entity),
    )
}

impl LocalData {
    pub(crate) fn check_health(&self) -> RepositoryResult<()> {
        if !self.is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }

    // ==================== Usage Records ====================

    fn push_usage_record(&mut self, record: &UsageRecord) -> UsageRecordId {
        let id = UsageRecordId::new(self.next_usage_id);
        self.next_usage_id += 1;

        let mut stored = record.clone();
        stored.id = Some(id);
        self.usage_records.insert(id.value(), stored);
        id
    }

    fn get_usage_record(&self, id: UsageRecordId) -> RepositoryResult<UsageRecord> {
        self.usage_records
            .get(&id.value())
            .cloned()
            .ok_or_else(|| not_found("get_usage_record", "usage_record", "Usage record", id))
    }

    pub(crate) fn insert_usage_records(&mut self, records: &[UsageRecord]) -> Vec<UsageRecordId> {
        let ids: Vec<UsageRecordId> = records
            .iter()
            .map(|record| self.push_usage_record(record))
            .collect();
        debug!("Stored {} usage records", ids.len());
        ids
    }

    pub(crate) fn update_usage_record(
        &mut self,
        id: UsageRecordId,
        record: &UsageRecord,
    ) -> RepositoryResult<UsageRecord> {
        let slot = self.usage_records.get_mut(&id.value()).ok_or_else(|| {
            not_found("update_usage_record", "usage_record", "Usage record", id)
        })?;

        let mut stored = record.clone();
        stored.id = Some(id);
        *slot = stored.clone();
        Ok(stored)
    }

    pub(crate) fn delete_usage_record(&mut self, id: UsageRecordId) -> RepositoryResult<()> {
        self.usage_records
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| not_found("delete_usage_record", "usage_record", "Usage record", id))
    }

    pub(crate) fn insert_import(
        &mut self,
        checksum: &str,
        format: UploadFormat,
        records: &[UsageRecord],
    ) -> ImportOutcome {
        if let Some(existing) = self.imports.get(checksum) {
            return ImportOutcome::Duplicate(existing.clone());
        }

        let batch = ImportBatch {
            checksum: checksum.to_string(),
            format,
            record_ids: self.insert_usage_records(records),
            imported_at: Utc::now(),
        };
        self.imports.insert(batch.checksum.clone(), batch.clone());
        ImportOutcome::Stored(batch)
    }

    // ==================== PC Registry ====================

    fn get_pc(&self, id: PcId) -> RepositoryResult<Pc> {
        self.pcs
            .get(&id.value())
            .cloned()
            .ok_or_else(|| not_found("get_pc", "pc", "PC", id))
    }

    pub(crate) fn insert_pc(&mut self, pc: &Pc) -> RepositoryResult<Pc> {
        if self.pcs.values().any(|existing| existing.number == pc.number) {
            return Err(rejected(
                "insert_pc",
                "pc",
                format!("PC number {} is already registered", pc.number),
            ));
        }

        let id = PcId::new(self.next_pc_id);
        self.next_pc_id += 1;

        let mut stored = pc.clone();
        stored.id = Some(id);
        self.pcs.insert(id.value(), stored.clone());
        Ok(stored)
    }

    pub(crate) fn insert_pcs_if_empty(&mut self, pcs: &[Pc]) -> RepositoryResult<Option<Vec<Pc>>> {
        if !self.pcs.is_empty() {
            return Ok(None);
        }

        let mut numbers = HashSet::new();
        if let Some(repeated) = pcs.iter().find(|pc| !numbers.insert(pc.number)) {
            return Err(rejected(
                "insert_pcs_if_empty",
                "pc",
                format!("PC number {} appears twice", repeated.number),
            ));
        }

        pcs.iter()
            .map(|pc| self.insert_pc(pc))
            .collect::<RepositoryResult<Vec<_>>>()
            .map(Some)
    }

    pub(crate) fn update_pc_status(&mut self, id: PcId, status: PcStatus) -> RepositoryResult<Pc> {
        let pc = self
            .pcs
            .get_mut(&id.value())
            .ok_or_else(|| not_found("update_pc_status", "pc", "PC", id))?;
        pc.status = status;
        debug!("PC {} is now {}", id, status);
        Ok(pc.clone())
    }

    pub(crate) fn delete_pc(&mut self, id: PcId) -> RepositoryResult<()> {
        self.pcs
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| not_found("delete_pc", "pc", "PC", id))
    }

    // ==================== Sessions ====================

    fn get_session(&self, id: SessionId) -> RepositoryResult<Session> {
        self.sessions
            .get(&id.value())
            .cloned()
            .ok_or_else(|| not_found("get_session", "session", "Session", id))
    }

    pub(crate) fn start_session(&mut self, session: &Session) -> RepositoryResult<Session> {
        if self
            .sessions
            .values()
            .any(|open| open.is_active() && open.pc_id == session.pc_id)
        {
            return Err(rejected(
                "start_session",
                "session",
                format!("PC {} already has an active session", session.pc_id),
            ));
        }

        let pc = self
            .pcs
            .get_mut(&session.pc_id.value())
            .ok_or_else(|| not_found("start_session", "pc", "PC", session.pc_id))?;
        if pc.status != PcStatus::Free {
            return Err(rejected(
                "start_session",
                "pc",
                format!("PC {} is {}", pc.number, pc.status),
            ));
        }
        pc.status = PcStatus::Occupied;
        let pc_number = pc.number;

        let id = SessionId::new(self.next_session_id);
        self.next_session_id += 1;

        let stored = Session {
            id: Some(id),
            pc_number,
            ended_at: None,
            status: SessionStatus::Active,
            ..session.clone()
        };
        self.sessions.insert(id.value(), stored.clone());
        debug!("Session {} started on PC {}", id, pc_number);
        Ok(stored)
    }

    pub(crate) fn end_session(
        &mut self,
        id: SessionId,
        ended_at: DateTime<Utc>,
    ) -> RepositoryResult<EndedSession> {
        let mut session = self
            .sessions
            .get(&id.value())
            .cloned()
            .ok_or_else(|| not_found("end_session", "session", "Session", id))?;
        if !session.is_active() {
            return Err(rejected(
                "end_session",
                "session",
                format!("Session {} has already ended", id),
            ));
        }

        let record_id = self.push_usage_record(&session.to_usage_record(ended_at));
        let usage_record = self.get_usage_record(record_id)?;

        session.status = SessionStatus::Ended;
        session.ended_at = Some(ended_at);
        self.sessions.insert(id.value(), session.clone());

        if let Some(pc) = self.pcs.get_mut(&session.pc_id.value()) {
            if pc.status == PcStatus::Occupied {
                pc.status = PcStatus::Free;
            }
        }

        debug!(
            "Session {} ended after {} minutes",
            id, usage_record.duration_minutes
        );
        Ok(EndedSession {
            session,
            usage_record,
        })
    }

    // ==================== Reservations ====================

    fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        self.reservations
            .get(&id.value())
            .cloned()
            .ok_or_else(|| not_found("get_reservation", "reservation", "Reservation", id))
    }

    fn find_conflict(&self, candidate: &Reservation) -> Option<&Reservation> {
        self.reservations
            .values()
            .filter(|existing| existing.id != candidate.id)
            .find(|existing| existing.conflicts_with(candidate))
    }

    pub(crate) fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> RepositoryResult<Reservation> {
        let pc = self
            .pcs
            .get(&reservation.pc_id.value())
            .ok_or_else(|| not_found("insert_reservation", "pc", "PC", reservation.pc_id))?;
        if pc.status == PcStatus::Maintenance {
            return Err(rejected(
                "insert_reservation",
                "pc",
                format!("PC {} is under maintenance", pc.number),
            ));
        }

        let id = ReservationId::new(self.next_reservation_id);
        let stored = Reservation {
            id: Some(id),
            ..reservation.clone()
        };
        if let Some(existing) = self.find_conflict(&stored) {
            return Err(rejected(
                "insert_reservation",
                "reservation",
                format!(
                    "PC {} is already reserved from {}",
                    pc.number, existing.start_time
                ),
            ));
        }

        self.next_reservation_id += 1;
        self.reservations.insert(id.value(), stored.clone());
        Ok(stored)
    }

    pub(crate) fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        let mut updated = self
            .get_reservation(id)
            .map_err(|e| e.with_operation("update_reservation_status"))?;
        updated.status = status;

        if self.find_conflict(&updated).is_some() {
            return Err(rejected(
                "update_reservation_status",
                "reservation",
                format!("Reservation {} overlaps another active booking", id),
            ));
        }

        self.reservations.insert(id.value(), updated.clone());
        Ok(updated)
    }

    pub(crate) fn delete_reservation(&mut self, id: ReservationId) -> RepositoryResult<()> {
        self.reservations
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| not_found("delete_reservation", "reservation", "Reservation", id))
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::from_data(LocalData::default())
    }

    pub(crate) fn from_data(data: LocalData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Copy of the current state, for persistence.
    pub(crate) fn snapshot(&self) -> LocalData {
        self.data.read().clone()
    }

    /// Swap in a new state, keeping the current health flag.
    pub(crate) fn replace(&self, mut next: LocalData) {
        let mut data = self.data.write();
        next.is_healthy = data.is_healthy;
        *data = next;
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository, keeping the health flag.
    pub fn clear(&self) {
        self.replace(LocalData::default());
    }

    pub fn usage_record_count(&self) -> usize {
        self.data.read().usage_records.len()
    }

    pub fn pc_count(&self) -> usize {
        self.data.read().pcs.len()
    }

    pub(crate) fn check_health(&self) -> RepositoryResult<()> {
        self.data.read().check_health()
    }

    fn read<T>(&self, op: impl FnOnce(&LocalData) -> RepositoryResult<T>) -> RepositoryResult<T> {
        let data = self.data.read();
        data.check_health()?;
        op(&data)
    }

    fn write<T>(
        &self,
        op: impl FnOnce(&mut LocalData) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let mut data = self.data.write();
        data.check_health()?;
        op(&mut data)
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_usage_records(&self) -> RepositoryResult<Vec<UsageRecord>> {
        self.read(|data| Ok(data.usage_records.values().cloned().collect()))
    }

    async fn get_usage_record(&self, id: UsageRecordId) -> RepositoryResult<UsageRecord> {
        self.read(|data| data.get_usage_record(id))
    }

    async fn insert_usage_records(
        &self,
        records: &[UsageRecord],
    ) -> RepositoryResult<Vec<UsageRecordId>> {
        self.write(|data| Ok(data.insert_usage_records(records)))
    }

    async fn update_usage_record(
        &self,
        id: UsageRecordId,
        record: &UsageRecord,
    ) -> RepositoryResult<UsageRecord> {
        self.write(|data| data.update_usage_record(id, record))
    }

    async fn delete_usage_record(&self, id: UsageRecordId) -> RepositoryResult<()> {
        self.write(|data| data.delete_usage_record(id))
    }

    async fn find_import_by_checksum(
        &self,
        checksum: &str,
    ) -> RepositoryResult<Option<ImportBatch>> {
        self.read(|data| Ok(data.imports.get(checksum).cloned()))
    }

    async fn insert_import(
        &self,
        checksum: &str,
        format: UploadFormat,
        records: &[UsageRecord],
    ) -> RepositoryResult<ImportOutcome> {
        self.write(|data| Ok(data.insert_import(checksum, format, records)))
    }
}

#[async_trait]
impl PcRepository for LocalRepository {
    async fn list_pcs(&self) -> RepositoryResult<Vec<Pc>> {
        self.read(|data| Ok(data.pcs.values().cloned().collect()))
    }

    async fn get_pc(&self, id: PcId) -> RepositoryResult<Pc> {
        self.read(|data| data.get_pc(id))
    }

    async fn insert_pc(&self, pc: &Pc) -> RepositoryResult<Pc> {
        self.write(|data| data.insert_pc(pc))
    }

    async fn insert_pcs_if_empty(&self, pcs: &[Pc]) -> RepositoryResult<Option<Vec<Pc>>> {
        self.write(|data| data.insert_pcs_if_empty(pcs))
    }

    async fn update_pc_status(&self, id: PcId, status: PcStatus) -> RepositoryResult<Pc> {
        self.write(|data| data.update_pc_status(id, status))
    }

    async fn delete_pc(&self, id: PcId) -> RepositoryResult<()> {
        self.write(|data| data.delete_pc(id))
    }
}

#[async_trait]
impl SessionRepository for LocalRepository {
    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>> {
        self.read(|data| Ok(data.sessions.values().rev().cloned().collect()))
    }

    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session> {
        self.read(|data| data.get_session(id))
    }

    async fn start_session(&self, session: &Session) -> RepositoryResult<Session> {
        self.write(|data| data.start_session(session))
    }

    async fn end_session(
        &self,
        id: SessionId,
        ended_at: DateTime<Utc>,
    ) -> RepositoryResult<EndedSession> {
        self.write(|data| data.end_session(id, ended_at))
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.read(|data| Ok(data.reservations.values().cloned().collect()))
    }

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        self.read(|data| data.get_reservation(id))
    }

    async fn insert_reservation(
        &self,
        reservation: &Reservation,
    ) -> RepositoryResult<Reservation> {
        self.write(|data| data.insert_reservation(reservation))
    }

    async fn update_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        self.write(|data| data.update_reservation_status(id, status))
    }

    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<()> {
        self.write(|data| data.delete_reservation(id))
    }
}
