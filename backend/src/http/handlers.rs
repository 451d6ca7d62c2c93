//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};

use super::dto::{
    CreatePcRequest, CreateReservationRequest, HealthResponse, ImportQuery, ImportReport,
    PcListResponse, ReservationListResponse, ReservationQuery, SessionListResponse,
    SessionQuery, StartSessionRequest, StatusUpdateRequest, StoreUsageResponse,
    UsageListResponse,
};
use super::error::AppError;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{
    EndedSession, Pc, PcId, PcStatus, PcStatusSummary, Reservation, ReservationId,
    ReservationStatus, Session, SessionId, TrainingResult, UsageRecord, UsageRecordId,
};
use crate::parsing::UploadFormat;
use crate::services::{DemandAnalysis, DemandPipeline};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_status<T: std::str::FromStr<Err = String>>(text: &str) -> Result<T, AppError> {
    text.parse().map_err(AppError::BadRequest)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Usage Records
// =============================================================================

/// GET /v1/usage
pub async fn list_usage(State(state): State<AppState>) -> HandlerResult<UsageListResponse> {
    let records = db_services::list_usage_records(state.repository.as_ref()).await?;
    let total = records.len();
    Ok(Json(UsageListResponse { records, total }))
}

/// POST /v1/usage
///
/// Store a JSON array of records as given; invalid ones are filtered at analysis time.
pub async fn create_usage(
    State(state): State<AppState>,
    ApiJson(records): ApiJson<Vec<UsageRecord>>,
) -> Result<(StatusCode, Json<StoreUsageResponse>), AppError> {
    let ids = db_services::store_usage_records(state.repository.as_ref(), &records).await?;
    let stored = ids.len();

    Ok((
        StatusCode::CREATED,
        Json(StoreUsageResponse {
            ids: ids.into_iter().map(|id| id.value()).collect(),
            stored,
        }),
    ))
}

/// GET /v1/usage/{id}
pub async fn get_usage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> HandlerResult<UsageRecord> {
    let record =
        db_services::get_usage_record(state.repository.as_ref(), UsageRecordId::new(id)).await?;
    Ok(Json(record))
}

/// PUT /v1/usage/{id}
pub async fn update_usage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(record): ApiJson<UsageRecord>,
) -> HandlerResult<UsageRecord> {
    let stored = db_services::update_usage_record(
        state.repository.as_ref(),
        UsageRecordId::new(id),
        &record,
    )
    .await?;
    Ok(Json(stored))
}

/// DELETE /v1/usage/{id}
pub async fn delete_usage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_usage_record(state.repository.as_ref(), UsageRecordId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/usage/import?format=csv|json
///
/// Upload a raw front-desk export. Without `format`, a JSON `Content-Type`
/// selects the JSON parser and anything else is read as CSV.
pub async fn import_usage(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ImportQuery>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<ImportReport>), AppError> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Upload body is empty".to_string()));
    }

    let format = query.format.unwrap_or_else(|| {
        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        if is_json {
            UploadFormat::Json
        } else {
            UploadFormat::Csv
        }
    });

    let report = db_services::import_usage_batch(state.repository.as_ref(), &body, format).await?;
    let status = if report.duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(report)))
}

// =============================================================================
// Demand Analysis
// =============================================================================

/// GET /v1/demand/summary
pub async fn get_demand_summary(State(state): State<AppState>) -> HandlerResult<TrainingResult> {
    let summary = db_services::summarize_stored_usage(state.repository.as_ref()).await?;
    Ok(Json(summary))
}

/// GET /v1/demand/analysis
pub async fn get_demand_analysis(
    State(state): State<AppState>,
) -> HandlerResult<DemandAnalysis> {
    let analysis = db_services::analyze_stored_usage(state.repository.as_ref()).await?;
    Ok(Json(analysis))
}

/// POST /v1/demand/analyze
///
/// Analyze a posted JSON array of records without storing them. Elements
/// that do not decode are listed in `rejectedRows` instead of failing the
/// request.
pub async fn analyze_demand(body: String) -> HandlerResult<DemandAnalysis> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Request body is empty".to_string()));
    }

    let analysis = DemandPipeline::new()
        .run_json_str(&body)
        .map_err(|e| AppError::BadRequest(format!("{:#}", e)))?;
    Ok(Json(analysis))
}

// =============================================================================
// PC Registry
// =============================================================================

/// GET /v1/pcs
pub async fn list_pcs(State(state): State<AppState>) -> HandlerResult<PcListResponse> {
    let pcs = db_services::list_pcs(state.repository.as_ref()).await?;
    let total = pcs.len();
    Ok(Json(PcListResponse { pcs, total }))
}

/// POST /v1/pcs
pub async fn create_pc(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePcRequest>,
) -> Result<(StatusCode, Json<Pc>), AppError> {
    let status = match request.status.as_deref() {
        Some(text) => parse_status(text)?,
        None => PcStatus::Free,
    };

    let pc = Pc {
        id: None,
        number: request.number,
        status,
        location: request.location,
        specs: request.specs,
    };
    let stored = db_services::register_pc(state.repository.as_ref(), &pc).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /v1/pcs/seed
///
/// Create the default floor if the registry is empty.
pub async fn seed_pcs(State(state): State<AppState>) -> HandlerResult<PcListResponse> {
    let pcs = db_services::seed_default_pcs(state.repository.as_ref()).await?;
    let total = pcs.len();
    Ok(Json(PcListResponse { pcs, total }))
}

/// GET /v1/pcs/summary
pub async fn get_pc_summary(State(state): State<AppState>) -> HandlerResult<PcStatusSummary> {
    let summary = db_services::pc_status_summary(state.repository.as_ref()).await?;
    Ok(Json(summary))
}

/// GET /v1/pcs/{id}
pub async fn get_pc(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> HandlerResult<Pc> {
    let pc = db_services::get_pc(state.repository.as_ref(), PcId::new(id)).await?;
    Ok(Json(pc))
}

/// PUT /v1/pcs/{id}/status
pub async fn update_pc_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<StatusUpdateRequest>,
) -> HandlerResult<Pc> {
    let status: PcStatus = parse_status(&request.status)?;
    let pc = db_services::set_pc_status(state.repository.as_ref(), PcId::new(id), status).await?;
    Ok(Json(pc))
}

/// DELETE /v1/pcs/{id}
pub async fn delete_pc(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    db_services::remove_pc(state.repository.as_ref(), PcId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Sessions
// =============================================================================

/// GET /v1/sessions?active=true
pub async fn list_sessions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
) -> HandlerResult<SessionListResponse> {
    let active_only = query.active.unwrap_or(false);
    let sessions = db_services::list_sessions(state.repository.as_ref(), active_only).await?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// POST /v1/sessions
///
/// Seat a user at a free PC; the PC becomes occupied.
pub async fn start_session(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StartSessionRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = db_services::start_session(
        state.repository.as_ref(),
        &request.user_id,
        PcId::new(request.pc_id),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> HandlerResult<Session> {
    let session = db_services::get_session(state.repository.as_ref(), SessionId::new(id)).await?;
    Ok(Json(session))
}

/// POST /v1/sessions/{id}/end
///
/// Close the session, store its usage record and free the PC.
pub async fn end_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> HandlerResult<EndedSession> {
    let ended = db_services::end_session(state.repository.as_ref(), SessionId::new(id)).await?;
    Ok(Json(ended))
}

// =============================================================================
// Reservations
// =============================================================================

/// GET /v1/reservations?userId=...
pub async fn list_reservations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReservationQuery>,
) -> HandlerResult<ReservationListResponse> {
    let reservations =
        db_services::list_reservations(state.repository.as_ref(), query.user_id.as_deref())
            .await?;
    let total = reservations.len();
    Ok(Json(ReservationListResponse {
        reservations,
        total,
    }))
}

/// POST /v1/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = Reservation {
        id: None,
        user_id: request.user_id,
        pc_id: PcId::new(request.pc_id),
        start_time: request.start_time,
        duration_hours: request.duration_hours,
        status: ReservationStatus::Active,
    };
    let stored = db_services::create_reservation(state.repository.as_ref(), &reservation).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /v1/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> HandlerResult<Reservation> {
    let reservation =
        db_services::get_reservation(state.repository.as_ref(), ReservationId::new(id)).await?;
    Ok(Json(reservation))
}

/// PUT /v1/reservations/{id}/status
pub async fn update_reservation_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<StatusUpdateRequest>,
) -> HandlerResult<Reservation> {
    let status: ReservationStatus = parse_status(&request.status)?;
    let reservation = db_services::set_reservation_status(
        state.repository.as_ref(),
        ReservationId::new(id),
        status,
    )
    .await?;
    Ok(Json(reservation))
}

/// DELETE /v1/reservations/{id}
pub async fn delete_reservation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_reservation(state.repository.as_ref(), ReservationId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
