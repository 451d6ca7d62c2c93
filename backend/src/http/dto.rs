//! Data Transfer Objects for the HTTP API.
//!
//! Domain types that already derive Serialize/Deserialize travel as they are
//! and are re-exported here; this module only adds request wrappers and
//! list envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::db::ImportReport;
pub use crate::models::{
    EndedSession, Pc, PcStatus, PcStatusSummary, Reservation, Session, TrainingResult,
    UsageRecord,
};
pub use crate::parsing::UploadFormat;
pub use crate::services::DemandAnalysis;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Response for listing usage records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageListResponse {
    pub records: Vec<UsageRecord>,
    pub total: usize,
}

/// Response for storing a batch of usage records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreUsageResponse {
    pub ids: Vec<i64>,
    pub stored: usize,
}

/// Query parameters for the import endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportQuery {
    /// Upload format; guessed from `Content-Type` when absent
    #[serde(default)]
    pub format: Option<UploadFormat>,
}

/// Response for listing PCs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcListResponse {
    pub pcs: Vec<Pc>,
    pub total: usize,
}

/// Request body for registering a PC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePcRequest {
    pub number: u32,
    pub location: String,
    #[serde(default)]
    pub specs: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for changing a PC or reservation status.
///
/// PCs accept `free` / `occupied` / `maintenance` as well as the front desk's
/// `libre` / `ocupada` / `mantenimiento`; reservations accept `active` /
/// `completed` / `cancelled` and `activa` / `completada` / `cancelada`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Query parameters for listing sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionQuery {
    /// Only sessions still running
    #[serde(default)]
    pub active: Option<bool>,
}

/// Response for listing sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
    pub total: usize,
}

/// Request body for starting a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub user_id: String,
    pub pc_id: i64,
}

/// Query parameters for listing reservations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response for listing reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
    pub total: usize,
}

/// Request body for booking a PC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub user_id: String,
    pub pc_id: i64,
    pub start_time: DateTime<Utc>,
    pub duration_hours: u32,
}
