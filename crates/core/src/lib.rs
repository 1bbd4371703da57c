//! # MedPulse Core
//!
//! Core triage logic for the MedPulse walk-in queue engine.
//!
//! This crate contains the scoring and ordering rules:
//! - Severity scoring from symptoms, age and free-text vitals
//! - Wait estimation from queue position and severity band
//! - The [`TriageQueue`] engine with atomic batched commits and history
//!
//! **No API concerns**: HTTP servers, serialised wire shapes or service
//! interfaces belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod history;
pub mod patient;
pub mod queue;
pub mod severity;
pub mod store;
pub mod vitals;
pub mod wait_time;

pub use config::{EngineConfig, DEFAULT_REST_ADDR};
pub use error::{TriageError, TriageResult};
pub use events::QueueEvent;
pub use history::{HistoryAction, QueueHistoryEntry};
pub use patient::{AdmissionRequest, Patient, PatientStatus, SeverityBand};
pub use queue::{Admission, QueueStats, TriageQueue};
pub use store::{MemoryStore, QueueStore, StoreError, StoreResult, WriteBatch};

// Validated field types are shared with the API layer.
pub use medpulse_types::{Age, AgeError, NonEmptyText, TextError};
