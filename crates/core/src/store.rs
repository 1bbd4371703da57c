//! Queue persistence seam.
//!
//! The engine talks to storage through [`QueueStore`]: three read operations
//! and a single all-or-nothing [`WriteBatch`] commit. A backing store must
//! apply a batch completely or reject it without touching state; the engine
//! relies on that to keep positions, estimates and history consistent under
//! failure.
//!
//! [`MemoryStore`] is the reference implementation used by the server binary
//! and the tests. A durable backend sits behind the same trait.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::history::QueueHistoryEntry;
use crate::patient::{Patient, PatientStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("patient {0} already exists")]
    DuplicatePatient(Uuid),
    #[error("patient {0} does not exist")]
    UnknownPatient(Uuid),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// WRITE BATCH
// ============================================================================

/// A set of writes that commits atomically.
///
/// The engine stages one batch per mutation: the inserted patient, the
/// position updates of everyone shifted by the reorder, and exactly one
/// history entry. The batch is the commit point; nothing before
/// [`QueueStore::apply`] is observable.
#[derive(Debug, Default)]
pub struct WriteBatch {
    inserts: Vec<Patient>,
    updates: Vec<Patient>,
    history: Vec<QueueHistoryEntry>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a new patient record. Fails at apply time if the id exists.
    pub fn insert(&mut self, patient: Patient) -> &mut Self {
        self.inserts.push(patient);
        self
    }

    /// Stages a replacement of an existing patient record.
    pub fn update(&mut self, patient: Patient) -> &mut Self {
        self.updates.push(patient);
        self
    }

    /// Stages a history entry.
    pub fn append_history(&mut self, entry: QueueHistoryEntry) -> &mut Self {
        self.history.push(entry);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.history.is_empty()
    }

    pub fn inserts(&self) -> &[Patient] {
        &self.inserts
    }

    pub fn updates(&self) -> &[Patient] {
        &self.updates
    }

    pub fn history(&self) -> &[QueueHistoryEntry] {
        &self.history
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Ordered patient store.
///
/// Implementations guarantee that [`apply`](QueueStore::apply) is atomic: on
/// error the store is exactly as it was before the call.
pub trait QueueStore {
    /// Waiting patients ordered by queue position.
    fn list_waiting(&self) -> StoreResult<Vec<Patient>>;

    /// Looks up one patient by id.
    fn get(&self, id: Uuid) -> StoreResult<Option<Patient>>;

    /// History entries for one patient, oldest first.
    fn history_for(&self, id: Uuid) -> StoreResult<Vec<QueueHistoryEntry>>;

    /// Commits a batch, applying every staged write or none of them.
    fn apply(&mut self, batch: WriteBatch) -> StoreResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory reference store.
///
/// Completed patients stay in the map with their position cleared; they fall
/// out of every waiting view, which is all the archival the engine requires.
#[derive(Debug, Default)]
pub struct MemoryStore {
    patients: HashMap<Uuid, Patient>,
    history: Vec<QueueHistoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total patients held, waiting or not.
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl QueueStore for MemoryStore {
    fn list_waiting(&self) -> StoreResult<Vec<Patient>> {
        let mut waiting: Vec<Patient> = self
            .patients
            .values()
            .filter(|p| p.status == PatientStatus::Waiting)
            .cloned()
            .collect();
        waiting.sort_by_key(|p| p.queue_position);
        Ok(waiting)
    }

    fn get(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self.patients.get(&id).cloned())
    }

    fn history_for(&self, id: Uuid) -> StoreResult<Vec<QueueHistoryEntry>> {
        Ok(self
            .history
            .iter()
            .filter(|entry| entry.patient_id == id)
            .cloned()
            .collect())
    }

    fn apply(&mut self, batch: WriteBatch) -> StoreResult<()> {
        // Validate the whole batch before touching state so the commit is
        // all-or-nothing.
        let mut staged: HashSet<Uuid> = HashSet::new();
        for patient in batch.inserts() {
            if self.patients.contains_key(&patient.id) || !staged.insert(patient.id) {
                return Err(StoreError::DuplicatePatient(patient.id));
            }
        }
        for patient in batch.updates() {
            if !self.patients.contains_key(&patient.id) && !staged.contains(&patient.id) {
                return Err(StoreError::UnknownPatient(patient.id));
            }
        }

        for patient in batch.inserts() {
            self.patients.insert(patient.id, patient.clone());
        }
        for patient in batch.updates() {
            self.patients.insert(patient.id, patient.clone());
        }
        self.history.extend(batch.history().iter().cloned());

        Ok(())
    }
}
