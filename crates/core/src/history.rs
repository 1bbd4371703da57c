//! Append-only queue history.
//!
//! Every committed admission and status transition leaves exactly one entry.
//! Entries are immutable once written; the history is the audit trail the
//! dashboard timeline is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patient::PatientStatus;

/// What happened to the patient.
///
/// Serialized with the wire names `checked_in`, `seen_by_doctor` and
/// `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    CheckedIn,
    SeenByDoctor,
    Completed,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HistoryAction::CheckedIn => "checked_in",
            HistoryAction::SeenByDoctor => "seen_by_doctor",
            HistoryAction::Completed => "completed",
        };
        write!(f, "{name}")
    }
}

/// One immutable history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueHistoryEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub action: HistoryAction,
    pub previous_position: Option<u32>,
    pub new_position: Option<u32>,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl QueueHistoryEntry {
    /// Entry recorded when a patient is admitted into the queue.
    pub fn checked_in(patient_id: Uuid, position: u32, severity_score: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            action: HistoryAction::CheckedIn,
            previous_position: None,
            new_position: Some(position),
            notes: format!("Patient checked in with severity score {severity_score}"),
            timestamp: Utc::now(),
        }
    }

    /// Entry recorded when a patient's status changes.
    pub fn status_changed(
        patient_id: Uuid,
        action: HistoryAction,
        previous_position: Option<u32>,
        status: PatientStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            action,
            previous_position,
            new_position: None,
            notes: format!("Status changed to {status}"),
            timestamp: Utc::now(),
        }
    }
}
