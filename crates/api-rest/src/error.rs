//! HTTP mapping for engine errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medpulse_core::TriageError;
use serde_json::json;

/// Boundary error: a status code plus the `{"error": ...}` payload.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// 404 for an id that does not resolve to a patient, parseable or not.
    pub fn unknown_patient(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("patient not found: {id}"),
        }
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        let status = match &err {
            TriageError::Validation(_) => StatusCode::BAD_REQUEST,
            TriageError::NotFound(_) => StatusCode::NOT_FOUND,
            TriageError::InvalidTransition { .. } => StatusCode::CONFLICT,
            TriageError::Persistence(_) | TriageError::ConcurrencyViolation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Engine internals stay in the logs, not in client payloads.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Triage engine error: {:?}", err);
            return Self {
                status,
                message: "Internal error".into(),
            };
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
