//! # API REST
//!
//! REST API implementation for MedPulse.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS)
//!
//! Uses `medpulse-core` for scoring, queue ordering and history.

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;

use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use medpulse_core::{MemoryStore, TriageQueue};

use crate::dto::{
    CheckInRequest, CheckInResponse, ErrorResponse, HealthResponse, HistoryEntryDto,
    HistoryResponse, PatientDto, QueueResponse, StatsResponse, UpdateStatusRequest,
    UpdateStatusResponse,
};
use crate::error::ApiError;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers.
/// The queue engine is the single ordering authority; handlers never touch
/// the store directly.
#[derive(Clone)]
pub struct AppState {
    queue: Arc<TriageQueue<MemoryStore>>,
}

impl AppState {
    pub fn new(queue: Arc<TriageQueue<MemoryStore>>) -> Self {
        Self { queue }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        check_in,
        get_queue,
        queue_stats,
        get_patient,
        update_status,
        patient_history,
    ),
    components(schemas(
        CheckInRequest,
        CheckInResponse,
        PatientDto,
        UpdateStatusRequest,
        UpdateStatusResponse,
        QueueResponse,
        StatsResponse,
        HistoryEntryDto,
        HistoryResponse,
        HealthResponse,
        ErrorResponse,
    ))
)]
struct ApiDoc;

/// Builds the full REST router with Swagger UI and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/triage", post(check_in))
        .route("/queue", get(get_queue))
        .route("/queue/stats", get(queue_stats))
        .route("/patients/:id", get(get_patient))
        .route("/patients/:id/status", post(update_status))
        .route("/patients/:id/history", get(patient_history))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_patient_id(id: &str) -> Result<Uuid, ApiError> {
    // An unparseable id simply does not resolve to a patient.
    Uuid::parse_str(id).map_err(|_| ApiError::unknown_patient(id))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthResponse)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the MedPulse REST API service.
/// This endpoint is used for monitoring and load balancer health checks.
///
/// # Returns
/// * `Json<HealthResponse>` - Health status response containing service status
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "MedPulse REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/triage",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Patient admitted into the waiting queue", body = CheckInResponse),
        (status = 400, description = "Missing or invalid intake fields", body = ErrorResponse),
        (status = 500, description = "Storage rejected the admission", body = ErrorResponse)
    )
)]
/// Check a walk-in patient into the triage queue
///
/// Scores the presentation from symptoms, age and optional vitals text,
/// inserts the patient at the severity-ordered position and returns the
/// admitted record with its queue ticket.
///
/// # Arguments
/// * `req` - Intake body; `name`, `age` and `symptoms` are required
///
/// # Returns
/// * `Ok(Json<CheckInResponse>)` - Admitted patient, position and ticket
/// * `Err(ApiError)` - 400 on validation failure, 500 on storage failure
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - a required field is missing or blank, or
/// - `age` is outside 1..=120.
#[axum::debug_handler]
async fn check_in(
    State(state): State<AppState>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let admission = state.queue.admit(req.into_admission()?)?;
    Ok(Json(CheckInResponse {
        success: true,
        queue_number: admission.queue_number,
        patient: admission.patient.into(),
        message: "Patient checked in successfully".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/queue",
    responses(
        (status = 200, description = "Waiting patients in treatment order", body = QueueResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
async fn get_queue(State(state): State<AppState>) -> Result<Json<QueueResponse>, ApiError> {
    let patients = state.queue.waiting()?;
    Ok(Json(QueueResponse {
        patients: patients.into_iter().map(PatientDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/queue/stats",
    responses(
        (status = 200, description = "Severity band counters and mean wait", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
async fn queue_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.queue.stats()?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient document", body = PatientDto),
        (status = 404, description = "Unknown patient", body = ErrorResponse)
    )
)]
/// Look up a single patient by id
///
/// # Errors
/// Returns `404 Not Found` if:
/// - the id does not parse as a UUID, or
/// - no patient with this id exists.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientDto>, ApiError> {
    let patient = state.queue.patient(parse_patient_id(&id)?)?;
    Ok(Json(patient.into()))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/status",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Patient moved to the new status", body = UpdateStatusResponse),
        (status = 400, description = "Missing or unknown status value", body = ErrorResponse),
        (status = 404, description = "Unknown patient", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
async fn update_status(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let patient_id = parse_patient_id(&id)?;
    let status = req.parse_status()?;
    let patient = state.queue.update_status(patient_id, status)?;
    Ok(Json(UpdateStatusResponse {
        success: true,
        patient: patient.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/history",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Audit entries, oldest first", body = HistoryResponse),
        (status = 404, description = "Unknown patient", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
async fn patient_history(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let entries = state.queue.history(parse_patient_id(&id)?)?;
    Ok(Json(HistoryResponse {
        entries: entries.into_iter().map(HistoryEntryDto::from).collect(),
    }))
}
