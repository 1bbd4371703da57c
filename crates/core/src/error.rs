use uuid::Uuid;

use crate::patient::PatientStatus;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// The message is the full client-facing sentence, served verbatim at
    /// the boundary.
    #[error("{0}")]
    Validation(String),
    #[error("patient not found: {0}")]
    NotFound(Uuid),
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: PatientStatus,
        to: PatientStatus,
    },
    #[error("storage failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("queue ordering violated: {0}")]
    ConcurrencyViolation(String),
}

impl TriageError {
    /// Error used when a lock is found poisoned by a panic in an earlier
    /// critical section. The queue state can no longer be trusted.
    pub(crate) fn poisoned_lock() -> Self {
        TriageError::ConcurrencyViolation("lock poisoned by an earlier panic".into())
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
