//! Admission control and queue ordering.
//!
//! [`TriageQueue`] is the single ordering authority. Every mutation (an
//! admission or a status transition) runs as one exclusive critical section:
//! snapshot the waiting list, mutate it, renumber positions to a dense
//! `1..=N`, refresh every wait estimate, verify the ordering, and commit the
//! whole change as one [`WriteBatch`]. Readers take the shared lock and always
//! observe a fully renumbered queue.
//!
//! Ordering is total: descending severity score, ties broken by arrival order
//! (earlier check-in keeps the better position; an internal admission counter
//! settles identical timestamps). Renumbering is linear in the waiting count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{TriageError, TriageResult};
use crate::events::QueueEvent;
use crate::history::{HistoryAction, QueueHistoryEntry};
use crate::patient::{AdmissionRequest, Patient, PatientStatus, SeverityBand};
use crate::severity;
use crate::store::{QueueStore, WriteBatch};
use crate::wait_time;

/// Buffered events per subscriber before a slow consumer starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of a successful admission.
#[derive(Debug, Clone)]
pub struct Admission {
    pub patient: Patient,
    /// Short ticket handed to the patient at the desk.
    pub queue_number: String,
}

/// Snapshot counters for the waiting queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub waiting: usize,
    pub critical: usize,
    pub moderate: usize,
    pub mild: usize,
    /// Mean of the waiting patients' estimates, rounded. `None` when the
    /// queue is empty.
    pub average_wait_minutes: Option<u32>,
}

/// The triage queue engine.
///
/// Owns the store behind a reader-writer lock and a seedable jitter source
/// behind a mutex. Shared via `Arc`; all methods take `&self`.
pub struct TriageQueue<S> {
    store: RwLock<S>,
    rng: Mutex<StdRng>,
    events: broadcast::Sender<QueueEvent>,
    arrivals: AtomicU64,
}

impl<S: QueueStore> TriageQueue<S> {
    /// Creates an engine seeded from operating-system entropy.
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Creates an engine with a fixed jitter seed. Every score and estimate
    /// becomes reproducible, which simulations and tests rely on.
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    /// Creates an engine with a caller-supplied generator.
    pub fn with_rng(store: S, rng: StdRng) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: RwLock::new(store),
            rng: Mutex::new(rng),
            events,
            arrivals: AtomicU64::new(0),
        }
    }

    /// Creates an engine honouring the configured jitter seed.
    pub fn from_config(store: S, cfg: &EngineConfig) -> Self {
        match cfg.jitter_seed() {
            Some(seed) => Self::with_seed(store, seed),
            None => Self::new(store),
        }
    }

    /// Subscribes to committed-mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Admits a walk-in patient.
    ///
    /// Scores the presentation, inserts the patient behind every waiting
    /// patient with an equal or higher score, renumbers positions, refreshes
    /// every waiting estimate and commits the lot as one batch. The history
    /// entry commits in the same batch: if storage rejects any part, the
    /// admission fails as a whole and nothing is retained.
    ///
    /// # Errors
    ///
    /// * [`TriageError::Persistence`] - the store rejected the commit
    /// * [`TriageError::ConcurrencyViolation`] - the rebuilt ordering failed
    ///   verification, which indicates a bug and is never retried
    pub fn admit(&self, request: AdmissionRequest) -> TriageResult<Admission> {
        let mut store = self.write_store()?;
        let mut rng = self.lock_rng()?;

        let (name, age, symptoms, vitals) = request.into_parts();
        let severity_score =
            severity::score(symptoms.as_str(), age, vitals.as_deref(), &mut *rng);

        let patient = Patient {
            id: Uuid::new_v4(),
            name,
            age,
            symptoms,
            vitals,
            severity_score,
            queue_position: None,
            estimated_wait_time: None,
            checked_in_at: Utc::now(),
            status: PatientStatus::Waiting,
            arrival_seq: self.arrivals.fetch_add(1, Ordering::Relaxed),
        };
        let id = patient.id;

        let mut waiting = store.list_waiting()?;
        // Strictly higher scores stay ahead; equal scores arrived earlier and
        // stay ahead too.
        let insert_at = waiting.partition_point(|p| p.severity_score >= severity_score);
        waiting.insert(insert_at, patient);

        Self::renumber(&mut waiting, &mut rng);
        Self::verify_ordering(&waiting)?;

        let position = insert_at as u32 + 1;
        let mut batch = WriteBatch::new();
        for p in &waiting {
            if p.id == id {
                batch.insert(p.clone());
            } else {
                batch.update(p.clone());
            }
        }
        batch.append_history(QueueHistoryEntry::checked_in(id, position, severity_score));
        store.apply(batch)?;

        let admitted = waiting.swap_remove(insert_at);
        tracing::info!(
            patient_id = %id,
            severity_score,
            queue_position = position,
            "patient admitted"
        );
        let _ = self.events.send(QueueEvent::PatientAdmitted {
            patient_id: id,
            queue_position: position,
            severity_score,
        });

        Ok(Admission {
            queue_number: admitted.queue_number(),
            patient: admitted,
        })
    }

    /// Moves a patient to a new status.
    ///
    /// Leaving the waiting queue clears the patient's position and estimate
    /// and renumbers everyone still waiting; the transition, the renumbering
    /// and the single history entry commit as one batch.
    ///
    /// # Errors
    ///
    /// * [`TriageError::NotFound`] - no patient with this id
    /// * [`TriageError::InvalidTransition`] - the edge is not in the status
    ///   machine; the queue is left untouched
    /// * [`TriageError::Persistence`] - the store rejected the commit
    pub fn update_status(&self, id: Uuid, new_status: PatientStatus) -> TriageResult<Patient> {
        let mut store = self.write_store()?;
        let mut rng = self.lock_rng()?;

        let mut patient = store.get(id)?.ok_or(TriageError::NotFound(id))?;
        if !patient.status.can_transition_to(new_status) {
            return Err(TriageError::InvalidTransition {
                from: patient.status,
                to: new_status,
            });
        }

        let previous_status = patient.status;
        let previous_position = patient.queue_position;
        patient.status = new_status;
        patient.queue_position = None;
        patient.estimated_wait_time = None;

        let mut batch = WriteBatch::new();
        batch.update(patient.clone());

        if previous_status == PatientStatus::Waiting {
            let mut waiting = store.list_waiting()?;
            waiting.retain(|p| p.id != id);
            Self::renumber(&mut waiting, &mut rng);
            Self::verify_ordering(&waiting)?;
            for p in waiting {
                batch.update(p);
            }
        }

        let action = if new_status == PatientStatus::InProgress {
            HistoryAction::SeenByDoctor
        } else {
            HistoryAction::Completed
        };
        batch.append_history(QueueHistoryEntry::status_changed(
            id,
            action,
            previous_position,
            new_status,
        ));
        store.apply(batch)?;

        tracing::info!(
            patient_id = %id,
            from = %previous_status,
            to = %new_status,
            "patient status updated"
        );
        let _ = self.events.send(QueueEvent::StatusChanged {
            patient_id: id,
            status: new_status,
        });

        Ok(patient)
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Waiting patients in treatment order.
    pub fn waiting(&self) -> TriageResult<Vec<Patient>> {
        let store = self.read_store()?;
        Ok(store.list_waiting()?)
    }

    /// Looks up one patient.
    pub fn patient(&self, id: Uuid) -> TriageResult<Patient> {
        let store = self.read_store()?;
        store.get(id)?.ok_or(TriageError::NotFound(id))
    }

    /// History entries for one patient, oldest first.
    pub fn history(&self, id: Uuid) -> TriageResult<Vec<QueueHistoryEntry>> {
        let store = self.read_store()?;
        if store.get(id)?.is_none() {
            return Err(TriageError::NotFound(id));
        }
        Ok(store.history_for(id)?)
    }

    /// Current queue counters.
    pub fn stats(&self) -> TriageResult<QueueStats> {
        let store = self.read_store()?;
        let waiting = store.list_waiting()?;

        let mut critical = 0;
        let mut moderate = 0;
        let mut mild = 0;
        for patient in &waiting {
            match patient.severity_band() {
                SeverityBand::Critical => critical += 1,
                SeverityBand::Moderate => moderate += 1,
                SeverityBand::Mild => mild += 1,
            }
        }

        let average_wait_minutes = if waiting.is_empty() {
            None
        } else {
            let total: u64 = waiting
                .iter()
                .filter_map(|p| p.estimated_wait_time)
                .map(u64::from)
                .sum();
            Some((total as f64 / waiting.len() as f64).round() as u32)
        };

        Ok(QueueStats {
            waiting: waiting.len(),
            critical,
            moderate,
            mild,
            average_wait_minutes,
        })
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Assigns dense positions `1..=N` and a fresh wait estimate to every
    /// waiting patient, in list order.
    fn renumber(waiting: &mut [Patient], rng: &mut StdRng) {
        for (index, patient) in waiting.iter_mut().enumerate() {
            let position = index as u32 + 1;
            patient.queue_position = Some(position);
            patient.estimated_wait_time =
                Some(wait_time::estimate(position, patient.severity_score, rng));
        }
    }

    /// Checks that positions are contiguous from 1 and that the list is
    /// ordered by descending severity with arrival order breaking ties. A
    /// failure means two mutations interleaved and is fatal.
    fn verify_ordering(waiting: &[Patient]) -> TriageResult<()> {
        for (index, patient) in waiting.iter().enumerate() {
            let expected = index as u32 + 1;
            if patient.queue_position != Some(expected) {
                return Err(TriageError::ConcurrencyViolation(format!(
                    "patient {} holds position {:?}, expected {}",
                    patient.id, patient.queue_position, expected
                )));
            }
        }

        for pair in waiting.windows(2) {
            let (ahead, behind) = (&pair[0], &pair[1]);
            let ordered = ahead.severity_score > behind.severity_score
                || (ahead.severity_score == behind.severity_score
                    && ahead.arrival_seq < behind.arrival_seq);
            if !ordered {
                return Err(TriageError::ConcurrencyViolation(format!(
                    "patients {} and {} are out of order",
                    ahead.id, behind.id
                )));
            }
        }

        Ok(())
    }

    fn write_store(&self) -> TriageResult<RwLockWriteGuard<'_, S>> {
        self.store.write().map_err(|_| TriageError::poisoned_lock())
    }

    fn read_store(&self) -> TriageResult<RwLockReadGuard<'_, S>> {
        self.store.read().map_err(|_| TriageError::poisoned_lock())
    }

    fn lock_rng(&self) -> TriageResult<MutexGuard<'_, StdRng>> {
        self.rng.lock().map_err(|_| TriageError::poisoned_lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use crate::wait_time::estimate_bounds;
    use proptest::prelude::*;
    use proptest::sample::Index;

    // Symptom texts whose score bands cannot overlap, jitter included:
    // "chest pain and vomiting" at 40 lands in 80..=90, "vomiting" at 4 in
    // 60..=70, "persistent cough" at 40 in 10..=20.
    const CRITICAL_CASE: (&str, i64) = ("chest pain and vomiting", 40);
    const MODERATE_CASE: (&str, i64) = ("vomiting", 4);
    const MILD_CASE: (&str, i64) = ("persistent cough", 40);

    fn engine() -> TriageQueue<MemoryStore> {
        TriageQueue::with_seed(MemoryStore::new(), 42)
    }

    fn walk_in(name: &str, case: (&str, i64)) -> AdmissionRequest {
        AdmissionRequest::new(name, case.1, case.0, None)
            .expect("test walk-in should pass validation")
    }

    fn assert_dense_positions(waiting: &[Patient]) {
        for (index, patient) in waiting.iter().enumerate() {
            assert_eq!(
                patient.queue_position,
                Some(index as u32 + 1),
                "positions must be dense and contiguous"
            );
            let (low, high) = estimate_bounds(index as u32 + 1, patient.severity_score);
            let estimate = patient
                .estimated_wait_time
                .expect("waiting patient must carry an estimate");
            assert!(
                (low..=high).contains(&estimate),
                "estimate {estimate} outside {low}..={high} for position {}",
                index + 1
            );
        }
    }

    #[test]
    fn test_admit_into_empty_queue_takes_position_one() {
        let queue = engine();
        let admission = queue
            .admit(AdmissionRequest::new(
                "Sarah Johnson",
                34,
                "severe chest pain, shortness of breath",
                None,
            ).expect("walk-in should pass validation"))
            .expect("admission should succeed");

        let patient = &admission.patient;
        assert_eq!(patient.queue_position, Some(1));
        assert!(
            (55..=65).contains(&patient.severity_score),
            "critical walk-in scored {}",
            patient.severity_score
        );
        assert_eq!(patient.status, PatientStatus::Waiting);
        assert!(patient.estimated_wait_time.is_some());

        assert_eq!(admission.queue_number.len(), 6);
        assert!(admission
            .queue_number
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        let waiting = queue.waiting().expect("waiting should succeed");
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, patient.id);
    }

    #[test]
    fn test_higher_severity_preempts_earlier_arrivals() {
        let queue = engine();
        let mild = queue
            .admit(walk_in("Mild", MILD_CASE))
            .expect("mild admission should succeed");
        let moderate = queue
            .admit(walk_in("Moderate", MODERATE_CASE))
            .expect("moderate admission should succeed");
        let critical = queue
            .admit(walk_in("Critical", CRITICAL_CASE))
            .expect("critical admission should succeed");

        let waiting = queue.waiting().expect("waiting should succeed");
        assert_eq!(
            waiting.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![critical.patient.id, moderate.patient.id, mild.patient.id]
        );
        assert_dense_positions(&waiting);
    }

    #[test]
    fn test_equal_scores_keep_arrival_order() {
        let queue = engine();
        let mut order = Vec::new();
        for n in 0..30 {
            let admission = queue
                .admit(walk_in(&format!("Walk-in {n}"), MILD_CASE))
                .expect("admission should succeed");
            order.push(admission.patient.id);
        }

        let waiting = queue.waiting().expect("waiting should succeed");
        assert_dense_positions(&waiting);

        let index_of = |id: Uuid| order.iter().position(|x| *x == id).unwrap();
        let mut saw_tie = false;
        for pair in waiting.windows(2) {
            if pair[0].severity_score == pair[1].severity_score {
                saw_tie = true;
                assert!(
                    index_of(pair[0].id) < index_of(pair[1].id),
                    "earlier arrival must keep the better position on a tie"
                );
            }
        }
        // 30 identical presentations over 11 possible scores must collide.
        assert!(saw_tie, "expected at least one severity tie");
    }

    #[test]
    fn test_front_departure_shifts_everyone_up() {
        let queue = engine();
        queue
            .admit(walk_in("Critical", CRITICAL_CASE))
            .expect("critical admission should succeed");
        queue
            .admit(walk_in("Moderate", MODERATE_CASE))
            .expect("moderate admission should succeed");
        queue
            .admit(walk_in("Mild", MILD_CASE))
            .expect("mild admission should succeed");

        let before = queue.waiting().expect("waiting should succeed");
        let front = before[0].clone();

        let updated = queue
            .update_status(front.id, PatientStatus::InProgress)
            .expect("transition should succeed");
        assert_eq!(updated.status, PatientStatus::InProgress);
        assert_eq!(updated.queue_position, None);
        assert_eq!(updated.estimated_wait_time, None);

        let after = queue.waiting().expect("waiting should succeed");
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, before[1].id);
        assert_eq!(after[1].id, before[2].id);
        assert_dense_positions(&after);
    }

    #[test]
    fn test_estimates_refresh_when_the_order_changes() {
        let queue = engine();
        let mild = queue
            .admit(walk_in("Mild", MILD_CASE))
            .expect("mild admission should succeed");
        // Mild at position 1: estimate in 18..=28.
        let first_estimate = mild.patient.estimated_wait_time.unwrap();
        let (low, high) = estimate_bounds(1, mild.patient.severity_score);
        assert!((low..=high).contains(&first_estimate));

        queue
            .admit(walk_in("Critical", CRITICAL_CASE))
            .expect("critical admission should succeed");

        // The mild patient slid to position 2; a stale position-1 estimate
        // cannot fall in the position-2 envelope (18..=28 vs 36..=46).
        let waiting = queue.waiting().expect("waiting should succeed");
        let shifted = waiting
            .iter()
            .find(|p| p.id == mild.patient.id)
            .expect("mild patient should still be waiting");
        assert_eq!(shifted.queue_position, Some(2));
        let (low, high) = estimate_bounds(2, shifted.severity_score);
        assert!((low..=high).contains(&shifted.estimated_wait_time.unwrap()));
    }

    #[test]
    fn test_waiting_patient_may_complete_directly() {
        let queue = engine();
        let admission = queue
            .admit(walk_in("Leaver", MILD_CASE))
            .expect("admission should succeed");

        let updated = queue
            .update_status(admission.patient.id, PatientStatus::Completed)
            .expect("waiting -> completed should be legal");
        assert_eq!(updated.status, PatientStatus::Completed);

        let history = queue
            .history(admission.patient.id)
            .expect("history should succeed");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, HistoryAction::Completed);
        assert_eq!(history[1].notes, "Status changed to completed");
    }

    #[test]
    fn test_illegal_transitions_are_rejected_without_changes() {
        let queue = engine();
        let admission = queue
            .admit(walk_in("Fixed", MILD_CASE))
            .expect("admission should succeed");
        let id = admission.patient.id;

        let err = queue
            .update_status(id, PatientStatus::Waiting)
            .expect_err("waiting -> waiting should be rejected");
        assert!(matches!(
            err,
            TriageError::InvalidTransition {
                from: PatientStatus::Waiting,
                to: PatientStatus::Waiting
            }
        ));

        queue
            .update_status(id, PatientStatus::Completed)
            .expect("waiting -> completed should succeed");
        let err = queue
            .update_status(id, PatientStatus::InProgress)
            .expect_err("completed -> in-progress should be rejected");
        assert!(matches!(err, TriageError::InvalidTransition { .. }));

        // The failed attempts must leave no trace: one check-in, one change.
        assert_eq!(queue.history(id).expect("history should succeed").len(), 2);
        assert_eq!(
            queue.patient(id).expect("lookup should succeed").status,
            PatientStatus::Completed
        );
    }

    #[test]
    fn test_unknown_patient_is_not_found() {
        let queue = engine();
        let ghost = Uuid::new_v4();

        assert!(matches!(
            queue.update_status(ghost, PatientStatus::Completed),
            Err(TriageError::NotFound(id)) if id == ghost
        ));
        assert!(matches!(
            queue.patient(ghost),
            Err(TriageError::NotFound(_))
        ));
        assert!(matches!(
            queue.history(ghost),
            Err(TriageError::NotFound(_))
        ));
    }

    #[test]
    fn test_every_mutation_writes_one_history_entry() {
        let queue = engine();
        let admission = queue
            .admit(walk_in("Audited", MODERATE_CASE))
            .expect("admission should succeed");
        let id = admission.patient.id;

        queue
            .update_status(id, PatientStatus::InProgress)
            .expect("waiting -> in-progress should succeed");
        queue
            .update_status(id, PatientStatus::Completed)
            .expect("in-progress -> completed should succeed");

        let history = queue.history(id).expect("history should succeed");
        let actions: Vec<HistoryAction> = history.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::CheckedIn,
                HistoryAction::SeenByDoctor,
                HistoryAction::Completed
            ]
        );

        assert_eq!(history[0].new_position, Some(1));
        assert!(history[0]
            .notes
            .starts_with("Patient checked in with severity score"));
        assert_eq!(history[1].previous_position, Some(1));
        assert_eq!(history[1].notes, "Status changed to in-progress");
        // Leaving in-progress involves no queue position.
        assert_eq!(history[2].previous_position, None);
    }

    #[test]
    fn test_stats_count_severity_bands() {
        let queue = engine();
        queue
            .admit(walk_in("Critical", CRITICAL_CASE))
            .expect("critical admission should succeed");
        queue
            .admit(walk_in("Moderate", MODERATE_CASE))
            .expect("moderate admission should succeed");
        queue
            .admit(walk_in("Mild", MILD_CASE))
            .expect("mild admission should succeed");

        let stats = queue.stats().expect("stats should succeed");
        assert_eq!(stats.waiting, 3);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.moderate, 1);
        assert_eq!(stats.mild, 1);
        assert!(stats.average_wait_minutes.is_some());

        let completed = queue.waiting().unwrap()[0].id;
        queue
            .update_status(completed, PatientStatus::Completed)
            .expect("transition should succeed");
        let stats = queue.stats().expect("stats should succeed");
        assert_eq!(stats.waiting, 2);
        assert_eq!(stats.critical, 0);
    }

    #[test]
    fn test_events_follow_committed_mutations() {
        let queue = engine();
        let mut events = queue.subscribe();

        let admission = queue
            .admit(walk_in("Watched", MILD_CASE))
            .expect("admission should succeed");
        let id = admission.patient.id;

        match events.try_recv().expect("admission event should be queued") {
            QueueEvent::PatientAdmitted {
                patient_id,
                queue_position,
                ..
            } => {
                assert_eq!(patient_id, id);
                assert_eq!(queue_position, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }

        queue
            .update_status(id, PatientStatus::InProgress)
            .expect("transition should succeed");
        match events.try_recv().expect("status event should be queued") {
            QueueEvent::StatusChanged { patient_id, status } => {
                assert_eq!(patient_id, id);
                assert_eq!(status, PatientStatus::InProgress);
            }
            other => panic!("unexpected event {other:?}"),
        }

        // A rejected mutation publishes nothing.
        queue
            .update_status(id, PatientStatus::InProgress)
            .expect_err("same-state transition should fail");
        assert!(events.try_recv().is_err());
    }

    // ------------------------------------------------------------------
    // Storage failure
    // ------------------------------------------------------------------

    /// Store that starts failing every commit after a set number of applies.
    struct FlakyStore {
        inner: MemoryStore,
        applies_before_failure: usize,
    }

    impl QueueStore for FlakyStore {
        fn list_waiting(&self) -> StoreResult<Vec<Patient>> {
            self.inner.list_waiting()
        }

        fn get(&self, id: Uuid) -> StoreResult<Option<Patient>> {
            self.inner.get(id)
        }

        fn history_for(&self, id: Uuid) -> StoreResult<Vec<QueueHistoryEntry>> {
            self.inner.history_for(id)
        }

        fn apply(&mut self, batch: WriteBatch) -> StoreResult<()> {
            if self.applies_before_failure == 0 {
                return Err(StoreError::Unavailable("disk full".into()));
            }
            self.applies_before_failure -= 1;
            self.inner.apply(batch)
        }
    }

    #[test]
    fn test_failed_admission_retains_nothing() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            applies_before_failure: 1,
        };
        let queue = TriageQueue::with_seed(store, 42);

        queue
            .admit(walk_in("Kept", MILD_CASE))
            .expect("first admission should succeed");
        let before = queue.waiting().expect("waiting should succeed");

        let err = queue
            .admit(walk_in("Dropped", CRITICAL_CASE))
            .expect_err("second admission should hit the storage failure");
        assert!(matches!(err, TriageError::Persistence(_)));

        let after = queue.waiting().expect("waiting should succeed");
        assert_eq!(after, before, "failed admission must leave the queue as it was");
    }

    #[test]
    fn test_failed_transition_retains_nothing() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            applies_before_failure: 1,
        };
        let queue = TriageQueue::with_seed(store, 42);

        let admission = queue
            .admit(walk_in("Stuck", MODERATE_CASE))
            .expect("admission should succeed");
        let id = admission.patient.id;

        let err = queue
            .update_status(id, PatientStatus::InProgress)
            .expect_err("transition should hit the storage failure");
        assert!(matches!(err, TriageError::Persistence(_)));

        let patient = queue.patient(id).expect("lookup should succeed");
        assert_eq!(patient.status, PatientStatus::Waiting);
        assert_eq!(patient.queue_position, Some(1));
        assert_eq!(queue.history(id).expect("history should succeed").len(), 1);
    }

    // ------------------------------------------------------------------
    // Concurrency
    // ------------------------------------------------------------------

    #[test]
    fn test_concurrent_admissions_never_share_a_position() {
        let queue = engine();
        let cases = [CRITICAL_CASE, MODERATE_CASE, MILD_CASE];

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let queue = &queue;
                let cases = &cases;
                scope.spawn(move || {
                    for n in 0..5 {
                        let case = cases[(worker + n) % cases.len()];
                        queue
                            .admit(walk_in(&format!("w{worker}-{n}"), case))
                            .expect("concurrent admission should succeed");
                    }
                });
            }
        });

        let waiting = queue.waiting().expect("waiting should succeed");
        assert_eq!(waiting.len(), 20);
        assert_dense_positions(&waiting);
        TriageQueue::<MemoryStore>::verify_ordering(&waiting)
            .expect("queue must stay totally ordered under concurrency");
    }

    // ------------------------------------------------------------------
    // Property tests
    // ------------------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Admit { pick: Index, age: i64 },
        Advance { pick: Index, complete: bool },
    }

    const SYMPTOM_CHOICES: &[&str] = &[
        "chest pain and vomiting",
        "high fever",
        "sprained wrist",
        "persistent cough",
        "dizziness and fainting",
        "general discomfort",
    ];

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<Index>(), 1i64..=120).prop_map(|(pick, age)| Op::Admit { pick, age }),
            (any::<Index>(), any::<bool>())
                .prop_map(|(pick, complete)| Op::Advance { pick, complete }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn queue_order_and_history_survive_any_sequence(
            ops in prop::collection::vec(op_strategy(), 1..40),
            seed in any::<u64>(),
        ) {
            let queue = TriageQueue::with_seed(MemoryStore::new(), seed);
            let mut admitted_ids = Vec::new();
            let mut mutations = 0u32;

            for op in ops {
                match op {
                    Op::Admit { pick, age } => {
                        let symptoms = SYMPTOM_CHOICES[pick.index(SYMPTOM_CHOICES.len())];
                        let request =
                            AdmissionRequest::new("Prop Patient", age, symptoms, None).unwrap();
                        let admission = queue.admit(request).unwrap();
                        admitted_ids.push(admission.patient.id);
                        mutations += 1;
                    }
                    Op::Advance { pick, complete } => {
                        let waiting = queue.waiting().unwrap();
                        if waiting.is_empty() {
                            continue;
                        }
                        let target = waiting[pick.index(waiting.len())].id;
                        let status = if complete {
                            PatientStatus::Completed
                        } else {
                            PatientStatus::InProgress
                        };
                        queue.update_status(target, status).unwrap();
                        mutations += 1;
                    }
                }

                let waiting = queue.waiting().unwrap();
                for (index, patient) in waiting.iter().enumerate() {
                    prop_assert_eq!(patient.queue_position, Some(index as u32 + 1));
                    let (low, high) = estimate_bounds(index as u32 + 1, patient.severity_score);
                    let estimate = patient.estimated_wait_time.unwrap();
                    prop_assert!((low..=high).contains(&estimate));
                }
                for pair in waiting.windows(2) {
                    prop_assert!(
                        pair[0].severity_score > pair[1].severity_score
                            || (pair[0].severity_score == pair[1].severity_score
                                && pair[0].arrival_seq < pair[1].arrival_seq)
                    );
                }
            }

            let recorded: usize = admitted_ids
                .iter()
                .map(|id| queue.history(*id).unwrap().len())
                .sum();
            prop_assert_eq!(recorded as u32, mutations);
        }
    }
}
