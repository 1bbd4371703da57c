//! Patient domain model.
//!
//! A [`Patient`] is created once at admission and then only changes status,
//! queue position and wait estimate. The status machine is monotonic: a
//! patient moves forward through `waiting -> in-progress -> completed` (or
//! straight from waiting to completed) and never back.

use chrono::{DateTime, Utc};
use medpulse_types::{Age, NonEmptyText};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    AGE_RANGE_MESSAGE, CRITICAL_BAND_MIN, MISSING_FIELDS_MESSAGE, MODERATE_BAND_MIN,
};
use crate::error::{TriageError, TriageResult};

// ============================================================================
// STATUS MACHINE
// ============================================================================

/// Where a patient sits in their visit.
///
/// Serialized with the wire names `waiting`, `in-progress` and `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientStatus {
    Waiting,
    InProgress,
    Completed,
}

impl PatientStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Legal edges are `waiting -> in-progress`, `waiting -> completed` and
    /// `in-progress -> completed`. Everything else, including same-state
    /// updates and any edge out of `completed`, is rejected.
    pub fn can_transition_to(self, next: PatientStatus) -> bool {
        matches!(
            (self, next),
            (PatientStatus::Waiting, PatientStatus::InProgress)
                | (PatientStatus::Waiting, PatientStatus::Completed)
                | (PatientStatus::InProgress, PatientStatus::Completed)
        )
    }
}

impl std::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PatientStatus::Waiting => "waiting",
            PatientStatus::InProgress => "in-progress",
            PatientStatus::Completed => "completed",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// SEVERITY BANDS
// ============================================================================

/// Coarse severity classification used by the wait-time multiplier and the
/// dashboard statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    Critical,
    Moderate,
    Mild,
}

impl SeverityBand {
    /// Classifies a severity score: critical at 80 and above, moderate from
    /// 60 to 79, mild below 60.
    pub fn from_score(score: u8) -> Self {
        if score >= CRITICAL_BAND_MIN {
            SeverityBand::Critical
        } else if score >= MODERATE_BAND_MIN {
            SeverityBand::Moderate
        } else {
            SeverityBand::Mild
        }
    }
}

impl std::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeverityBand::Critical => "critical",
            SeverityBand::Moderate => "moderate",
            SeverityBand::Mild => "mild",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// PATIENT RECORD
// ============================================================================

/// A patient admitted to the triage queue.
///
/// `queue_position` and `estimated_wait_time` are only meaningful while the
/// patient is waiting; both are cleared when the patient leaves the queue.
/// The position is a cache of the engine's ordering, the estimate a cache of
/// the wait-time function; neither is ever a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: NonEmptyText,
    pub age: Age,
    pub symptoms: NonEmptyText,
    pub vitals: Option<String>,
    pub severity_score: u8,
    pub queue_position: Option<u32>,
    pub estimated_wait_time: Option<u32>,
    pub checked_in_at: DateTime<Utc>,
    pub status: PatientStatus,
    /// Process-wide admission counter. Makes the ordering tie-break total
    /// when two patients check in on the same timestamp.
    #[serde(skip)]
    pub(crate) arrival_seq: u64,
}

impl Patient {
    /// The short check-in ticket shown to the patient: the last six hex
    /// characters of the id, uppercased.
    pub fn queue_number(&self) -> String {
        let simple = self.id.simple().to_string();
        simple[simple.len() - 6..].to_uppercase()
    }

    /// Severity band for this patient's score.
    pub fn severity_band(&self) -> SeverityBand {
        SeverityBand::from_score(self.severity_score)
    }

    pub fn is_waiting(&self) -> bool {
        self.status == PatientStatus::Waiting
    }
}

// ============================================================================
// ADMISSION REQUEST
// ============================================================================

/// Validated intake data for one walk-in.
///
/// Constructing an `AdmissionRequest` is the validation step of admission:
/// once a value exists, name, age and symptoms are known good and the engine
/// performs no further input checks.
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    name: NonEmptyText,
    age: Age,
    symptoms: NonEmptyText,
    vitals: Option<String>,
}

impl AdmissionRequest {
    /// Validates raw intake fields into an `AdmissionRequest`.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Validation`] when name or symptoms are blank or
    /// when the age lies outside `1..=120`. Blank vitals are normalised to
    /// `None` rather than rejected.
    pub fn new(
        name: impl AsRef<str>,
        age: i64,
        symptoms: impl AsRef<str>,
        vitals: Option<String>,
    ) -> TriageResult<Self> {
        let name = NonEmptyText::new(name)
            .map_err(|_| TriageError::Validation(MISSING_FIELDS_MESSAGE.into()))?;
        let symptoms = NonEmptyText::new(symptoms)
            .map_err(|_| TriageError::Validation(MISSING_FIELDS_MESSAGE.into()))?;
        let age = Age::new(age).map_err(|_| TriageError::Validation(AGE_RANGE_MESSAGE.into()))?;
        let vitals = vitals
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            name,
            age,
            symptoms,
            vitals,
        })
    }

    pub fn name(&self) -> &NonEmptyText {
        &self.name
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn symptoms(&self) -> &NonEmptyText {
        &self.symptoms
    }

    pub fn vitals(&self) -> Option<&str> {
        self.vitals.as_deref()
    }

    pub(crate) fn into_parts(self) -> (NonEmptyText, Age, NonEmptyText, Option<String>) {
        (self.name, self.age, self.symptoms, self.vitals)
    }
}
