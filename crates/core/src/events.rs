//! Committed-mutation notifications.
//!
//! The engine publishes one event per committed mutation on a broadcast
//! channel. Viewers (the server's event logger, a future websocket fan-out)
//! subscribe and refetch whatever queue state they need; events carry ids,
//! not snapshots. Delivery is best-effort broadcast semantics: a lagging
//! subscriber misses events, the queue itself is never affected.

use uuid::Uuid;

use crate::patient::PatientStatus;

/// A change that has been committed to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// A patient was admitted at the given position.
    PatientAdmitted {
        patient_id: Uuid,
        queue_position: u32,
        severity_score: u8,
    },
    /// A patient's status changed.
    StatusChanged {
        patient_id: Uuid,
        status: PatientStatus,
    },
}
