//! Wire shapes for the REST boundary.
//!
//! Request DTOs keep every intake field optional so a missing field produces
//! the boundary's own 400 payload rather than a deserialisation rejection.
//! Response DTOs are built from core domain types and never shared with them.

use medpulse_core::constants::MISSING_FIELDS_MESSAGE;
use medpulse_core::{
    AdmissionRequest, Patient, PatientStatus, QueueHistoryEntry, QueueStats, TriageError,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Intake body for `POST /triage`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub symptoms: Option<String>,
    pub vitals: Option<String>,
}

impl CheckInRequest {
    /// Turns the wire body into a validated admission request.
    ///
    /// # Errors
    ///
    /// [`TriageError::Validation`] when a required field is absent, blank or
    /// out of range.
    pub fn into_admission(self) -> Result<AdmissionRequest, TriageError> {
        match (self.name, self.age, self.symptoms) {
            (Some(name), Some(age), Some(symptoms)) => {
                AdmissionRequest::new(name, age, symptoms, self.vitals)
            }
            _ => Err(TriageError::Validation(MISSING_FIELDS_MESSAGE.into())),
        }
    }
}

/// Patient document as served to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientDto {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub symptoms: String,
    pub vitals: Option<String>,
    pub severity_score: u8,
    pub severity_band: String,
    pub queue_position: Option<u32>,
    pub estimated_wait_time: Option<u32>,
    pub checked_in_at: String,
    pub status: String,
}

impl From<Patient> for PatientDto {
    fn from(patient: Patient) -> Self {
        let severity_band = patient.severity_band().to_string();
        Self {
            id: patient.id.to_string(),
            name: patient.name.to_string(),
            age: patient.age.years(),
            symptoms: patient.symptoms.to_string(),
            vitals: patient.vitals,
            severity_score: patient.severity_score,
            severity_band,
            queue_position: patient.queue_position,
            estimated_wait_time: patient.estimated_wait_time,
            checked_in_at: patient.checked_in_at.to_rfc3339(),
            status: patient.status.to_string(),
        }
    }
}

/// Success body for `POST /triage`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckInResponse {
    pub success: bool,
    pub patient: PatientDto,
    /// Short ticket shown to the patient; original wire key.
    #[serde(rename = "queueNumber")]
    pub queue_number: String,
    pub message: String,
}

/// Body for `POST /patients/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    /// Parses the requested status against the wire names.
    ///
    /// # Errors
    ///
    /// [`TriageError::Validation`] when the field is absent or not one of
    /// `waiting`, `in-progress`, `completed`.
    pub fn parse_status(&self) -> Result<PatientStatus, TriageError> {
        let value = self
            .status
            .as_deref()
            .ok_or_else(|| TriageError::Validation("Missing required field: status".into()))?;
        match value {
            "waiting" => Ok(PatientStatus::Waiting),
            "in-progress" => Ok(PatientStatus::InProgress),
            "completed" => Ok(PatientStatus::Completed),
            other => Err(TriageError::Validation(format!("Unknown status: {other}"))),
        }
    }
}

/// Success body for `POST /patients/{id}/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub patient: PatientDto,
}

/// Body for `GET /queue`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueResponse {
    pub patients: Vec<PatientDto>,
}

/// Body for `GET /queue/stats`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    pub waiting: usize,
    pub critical: usize,
    pub moderate: usize,
    pub mild: usize,
    pub average_wait_minutes: Option<u32>,
}

impl From<QueueStats> for StatsResponse {
    fn from(stats: QueueStats) -> Self {
        Self {
            waiting: stats.waiting,
            critical: stats.critical,
            moderate: stats.moderate,
            mild: stats.mild,
            average_wait_minutes: stats.average_wait_minutes,
        }
    }
}

/// One audit record in `GET /patients/{id}/history`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntryDto {
    pub id: String,
    pub patient_id: String,
    pub action: String,
    pub previous_position: Option<u32>,
    pub new_position: Option<u32>,
    pub notes: String,
    pub timestamp: String,
}

impl From<QueueHistoryEntry> for HistoryEntryDto {
    fn from(entry: QueueHistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            patient_id: entry.patient_id.to_string(),
            action: entry.action.to_string(),
            previous_position: entry.previous_position,
            new_position: entry.new_position,
            notes: entry.notes,
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

/// Body for `GET /patients/{id}/history`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntryDto>,
}

/// Body for `GET /health`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
}

/// Error payload shape; every non-2xx response carries it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
