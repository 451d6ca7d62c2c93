//! High-level database service layer.
//!
//! Repository-agnostic operations holding the business rules that must be
//! the same for every storage backend: upload deduplication, registry
//! seeding, the session lifecycle, reservation rules and running the demand
//! pipeline over stored sessions.
//!
//! # Usage
//!
//! ```no_run
//! use cybercafe::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let summary = services::summarize_stored_usage(&repo).await?;
//!     println!("Peak hours: {:?}", summary.peak_hours);
//!     Ok(())
//! }
//! ```

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};

use super::checksum::calculate_checksum;
use super::models::{ImportBatch, ImportOutcome};
use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    EndedSession, Pc, PcId, PcStatus, PcStatusSummary, Reservation, ReservationId,
    ReservationStatus, Session, SessionId, TrainingResult, UsageRecord, UsageRecordId,
    RESERVATION_HOURS,
};
use crate::parsing::{self, RejectedRow, UploadFormat};
use crate::services::{demand, DemandAnalysis, DemandPipeline};

/// Size of the default floor created by [`seed_default_pcs`].
pub const DEFAULT_PC_COUNT: u32 = 20;
/// Workstations per zone in the default floor.
const PCS_PER_ZONE: u32 = 5;
const DEFAULT_PC_SPECS: &str = "Intel i7, 16GB RAM, RTX 3060";

/// Outcome of importing one uploaded export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub checksum: String,
    pub format: UploadFormat,
    pub stored_ids: Vec<UsageRecordId>,
    pub rejected: Vec<RejectedRow>,
    /// True when the same payload had already been imported; nothing new was stored.
    pub duplicate: bool,
}

// ==================== Health & Connection ====================

/// Check if the backing store is healthy.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Usage Records ====================

/// List every stored usage record.
pub async fn list_usage_records<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<UsageRecord>> {
    repo.list_usage_records().await
}

pub async fn get_usage_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: UsageRecordId,
) -> RepositoryResult<UsageRecord> {
    repo.get_usage_record(id).await
}

/// Store records as given.
///
/// Invalid records are kept on purpose: cleaning happens at analysis time, so
/// the cleaning report over stored data stays meaningful.
pub async fn store_usage_records<R: FullRepository + ?Sized>(
    repo: &R,
    records: &[UsageRecord],
) -> RepositoryResult<Vec<UsageRecordId>> {
    let ids = repo.insert_usage_records(records).await?;
    info!("Stored {} usage records", ids.len());
    Ok(ids)
}

pub async fn update_usage_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: UsageRecordId,
    record: &UsageRecord,
) -> RepositoryResult<UsageRecord> {
    repo.update_usage_record(id, record).await
}

pub async fn delete_usage_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: UsageRecordId,
) -> RepositoryResult<()> {
    repo.delete_usage_record(id).await
}

/// Parse and store an uploaded export.
///
/// 1. Hash the payload; if an import with the same checksum exists, return
///    its ids flagged as duplicate without parsing anything
/// 2. Parse it, keeping per-row rejections for the report
/// 3. Store the parsed records and remember the import in one repository
///    step, so a concurrent upload of the same payload cannot store it twice
///
/// # Returns
/// * `Err(RepositoryError::ValidationError)` - If the payload is structurally unreadable
pub async fn import_usage_batch<R: FullRepository + ?Sized>(
    repo: &R,
    content: &str,
    format: UploadFormat,
) -> RepositoryResult<ImportReport> {
    let checksum = calculate_checksum(content);

    if let Some(existing) = repo.find_import_by_checksum(&checksum).await? {
        return Ok(duplicate_report(existing));
    }

    let batch = parsing::parse_usage_str(content, format)
        .map_err(|e| RepositoryError::validation(format!("{:#}", e)))?;

    match repo.insert_import(&checksum, format, &batch.records).await? {
        ImportOutcome::Stored(stored) => {
            info!(
                "Imported {} {} records ({} rows rejected)",
                stored.record_ids.len(),
                format,
                batch.rejected.len()
            );
            Ok(ImportReport {
                checksum: stored.checksum,
                format,
                stored_ids: stored.record_ids,
                rejected: batch.rejected,
                duplicate: false,
            })
        }
        ImportOutcome::Duplicate(existing) => Ok(duplicate_report(existing)),
    }
}

fn duplicate_report(existing: ImportBatch) -> ImportReport {
    info!(
        "Upload {} already imported at {}, skipping",
        existing.checksum.get(..12).unwrap_or(&existing.checksum),
        existing.imported_at
    );
    ImportReport {
        checksum: existing.checksum,
        format: existing.format,
        stored_ids: existing.record_ids,
        rejected: Vec::new(),
        duplicate: true,
    }
}

// ==================== Demand Analysis ====================

/// Run the full demand pipeline over every stored record.
pub async fn analyze_stored_usage<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<DemandAnalysis> {
    let records = repo.list_usage_records().await?;
    Ok(DemandPipeline::new().run(records))
}

/// Hourly demand summary over every stored record.
pub async fn summarize_stored_usage<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<TrainingResult> {
    let records = repo.list_usage_records().await?;
    Ok(demand::summarize(&records))
}

// ==================== PC Registry ====================

pub async fn list_pcs<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Pc>> {
    repo.list_pcs().await
}

pub async fn get_pc<R: FullRepository + ?Sized>(repo: &R, id: PcId) -> RepositoryResult<Pc> {
    repo.get_pc(id).await
}

/// Register a workstation. Its number must not be taken.
pub async fn register_pc<R: FullRepository + ?Sized>(repo: &R, pc: &Pc) -> RepositoryResult<Pc> {
    if pc.number == 0 {
        return Err(RepositoryError::validation("PC number must be positive"));
    }
    let stored = repo.insert_pc(pc).await?;
    info!("Registered PC {} in {}", stored.number, stored.location);
    Ok(stored)
}

pub async fn remove_pc<R: FullRepository + ?Sized>(repo: &R, id: PcId) -> RepositoryResult<()> {
    repo.delete_pc(id).await
}

/// The default floor layout: numbers 1 to 20, five per zone.
pub fn default_pcs() -> Vec<Pc> {
    (1..=DEFAULT_PC_COUNT)
        .map(|number| {
            let status = if number % 7 == 0 {
                PcStatus::Occupied
            } else if number % 11 == 0 {
                PcStatus::Maintenance
            } else {
                PcStatus::Free
            };

            Pc {
                id: None,
                number,
                status,
                location: format!("Zone {}", number / PCS_PER_ZONE + 1),
                specs: DEFAULT_PC_SPECS.to_string(),
            }
        })
        .collect()
}

/// Populate an empty registry with [`default_pcs`].
///
/// A registry that already has workstations is left untouched; the check
/// and the inserts happen in one repository step.
///
/// # Returns
/// The registry contents after seeding.
pub async fn seed_default_pcs<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Pc>> {
    match repo.insert_pcs_if_empty(&default_pcs()).await? {
        Some(seeded) => {
            info!("Seeded {} PCs", seeded.len());
            Ok(seeded)
        }
        None => {
            let existing = repo.list_pcs().await?;
            info!(
                "PC registry already has {} entries, not seeding",
                existing.len()
            );
            Ok(existing)
        }
    }
}

pub async fn set_pc_status<R: FullRepository + ?Sized>(
    repo: &R,
    id: PcId,
    status: PcStatus,
) -> RepositoryResult<Pc> {
    repo.update_pc_status(id, status).await
}

/// Counts of workstations per status.
pub async fn pc_status_summary<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<PcStatusSummary> {
    let pcs = repo.list_pcs().await?;
    Ok(PcStatusSummary::from_pcs(&pcs))
}

// ==================== Sessions ====================

/// List sessions, newest first; with `active_only` just the open ones.
pub async fn list_sessions<R: FullRepository + ?Sized>(
    repo: &R,
    active_only: bool,
) -> RepositoryResult<Vec<Session>> {
    let mut sessions = repo.list_sessions().await?;
    if active_only {
        sessions.retain(Session::is_active);
    }
    Ok(sessions)
}

pub async fn get_session<R: FullRepository + ?Sized>(
    repo: &R,
    id: SessionId,
) -> RepositoryResult<Session> {
    repo.get_session(id).await
}

/// Seat `user_id` at a free PC, starting now.
pub async fn start_session<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    pc_id: PcId,
) -> RepositoryResult<Session> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(RepositoryError::validation_with_context(
            "A session needs a user",
            ErrorContext::new("start_session").with_entity("session"),
        ));
    }

    let session = repo
        .start_session(&Session::start(user_id, pc_id, Utc::now()))
        .await?;
    info!("{} started a session on PC {}", session.user_id, session.pc_number);
    Ok(session)
}

/// Close a session now; its usage record is stored and the PC freed.
pub async fn end_session<R: FullRepository + ?Sized>(
    repo: &R,
    id: SessionId,
) -> RepositoryResult<EndedSession> {
    let ended = repo.end_session(id, Utc::now()).await?;
    info!(
        "Session {} on PC {} ended after {} minutes",
        id, ended.session.pc_number, ended.usage_record.duration_minutes
    );
    Ok(ended)
}

// ==================== Reservations ====================

/// List reservations, optionally only those of one user.
pub async fn list_reservations<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: Option<&str>,
) -> RepositoryResult<Vec<Reservation>> {
    let mut reservations = repo.list_reservations().await?;
    if let Some(user_id) = user_id {
        reservations.retain(|r| r.user_id == user_id);
    }
    Ok(reservations)
}

pub async fn get_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReservationId,
) -> RepositoryResult<Reservation> {
    repo.get_reservation(id).await
}

/// Book a PC.
///
/// The reservation is stored as active. It must name a user, use one of
/// [`RESERVATION_HOURS`] and not be over already.
pub async fn create_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    reservation: &Reservation,
) -> RepositoryResult<Reservation> {
    let invalid = |message: String| {
        RepositoryError::validation_with_context(
            message,
            ErrorContext::new("create_reservation").with_entity("reservation"),
        )
    };

    if reservation.user_id.trim().is_empty() {
        return Err(invalid("A reservation needs a user".to_string()));
    }
    if !RESERVATION_HOURS.contains(&reservation.duration_hours) {
        return Err(invalid(format!(
            "Reservations last one of {:?} hours, not {}",
            RESERVATION_HOURS, reservation.duration_hours
        )));
    }
    if reservation.end_time() <= Utc::now() {
        return Err(invalid(format!(
            "Reservation starting {} is already over",
            reservation.start_time
        )));
    }

    let stored = repo
        .insert_reservation(&Reservation {
            id: None,
            status: ReservationStatus::Active,
            ..reservation.clone()
        })
        .await?;
    info!(
        "{} reserved PC {} for {}h from {}",
        stored.user_id, stored.pc_id, stored.duration_hours, stored.start_time
    );
    Ok(stored)
}

pub async fn set_reservation_status<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReservationId,
    status: ReservationStatus,
) -> RepositoryResult<Reservation> {
    repo.update_reservation_status(id, status).await
}

pub async fn delete_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReservationId,
) -> RepositoryResult<()> {
    repo.delete_reservation(id).await
}
