//! Session orchestration.
//!
//! [`SedationSession`] owns the record, the ledger, the timer, the
//! stamps and the store, and runs the mutate → persist → recompose
//! cycle: every mutating operation captures the full snapshot, writes it
//! to the slot and re-renders the clinical log before returning. That
//! cycle is the system's only ordering guarantee.

use thiserror::Error;

use crate::advisor::{self, AdvisorError};
use crate::clock::Clock;
use crate::compose::compose_clinical_log;
use crate::ledger::ObservationLedger;
use crate::letter::{compose_discharge_letter, DischargeLetter};
use crate::models::{EntryId, ObservationEntry, SedationRecord};
use crate::store::{Snapshot, SnapshotStore, StoreError, StoreResult};
use crate::timer::{ProcedureStamps, SedationTimer, TickEvent};

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Outcome of a gated timer start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The safety time-out checklist is incomplete. Warn the user; they
    /// may proceed via [`SedationSession::start_timer_override`].
    BlockedByTimeOut,
}

/// One active charting session over one durable slot.
pub struct SedationSession {
    clock: Box<dyn Clock>,
    store: SnapshotStore,
    record: SedationRecord,
    ledger: ObservationLedger,
    timer: SedationTimer,
    stamps: ProcedureStamps,
    dose_advisory: Option<String>,
    dose_advisory_visible: bool,
    document: String,
}

impl SedationSession {
    /// Open a session over the store, restoring any persisted snapshot.
    /// With an empty slot this still composes the initial (empty-state)
    /// document.
    pub fn open(store: SnapshotStore, clock: Box<dyn Clock>) -> StoreResult<Self> {
        let mut session = Self {
            clock,
            store,
            record: SedationRecord::default(),
            ledger: ObservationLedger::new(),
            timer: SedationTimer::new(),
            stamps: ProcedureStamps::default(),
            dose_advisory: None,
            dose_advisory_visible: false,
            document: String::new(),
        };
        if let Some(snapshot) = session.store.load()? {
            session.restore(snapshot);
        }
        session.recompose();
        Ok(session)
    }

    // -----------------------------------------------------------------
    // Record mutation
    // -----------------------------------------------------------------

    pub fn record(&self) -> &SedationRecord {
        &self.record
    }

    /// Apply a field edit, then persist and recompose.
    pub fn update_record<F>(&mut self, edit: F) -> SessionResult<()>
    where
        F: FnOnce(&mut SedationRecord),
    {
        edit(&mut self.record);
        self.sync()
    }

    // -----------------------------------------------------------------
    // Row tables
    // -----------------------------------------------------------------

    pub fn ledger(&self) -> &ObservationLedger {
        &self.ledger
    }

    /// Record an administered drug. The caller supplies the resolved
    /// (name, dose) pair; the operator is stamped from the sedationist
    /// field.
    pub fn add_drug(&mut self, name: &str, dose: &str) -> SessionResult<EntryId> {
        let recorded_by = self.record.staff.sedationist.clone();
        let id = self
            .ledger
            .add_drug(name, dose, &recorded_by, self.clock.as_ref());
        self.sync()?;
        Ok(id)
    }

    pub fn remove_drug(&mut self, id: &str) -> SessionResult<bool> {
        let removed = self.ledger.remove_drug(id);
        self.sync()?;
        Ok(removed)
    }

    /// Append an observation row labeled from the timer's elapsed time.
    pub fn add_observation(&mut self) -> SessionResult<EntryId> {
        let id = self
            .ledger
            .add_observation(self.timer.elapsed_secs(), self.clock.as_ref());
        self.sync()?;
        Ok(id)
    }

    pub fn remove_observation(&mut self, id: &str) -> SessionResult<bool> {
        let removed = self.ledger.remove_observation(id);
        self.sync()?;
        Ok(removed)
    }

    /// Edit one observation row's cells in place.
    pub fn update_observation<F>(&mut self, id: &str, edit: F) -> SessionResult<bool>
    where
        F: FnOnce(&mut ObservationEntry),
    {
        let found = match self.ledger.observation_mut(id) {
            Some(entry) => {
                edit(entry);
                true
            }
            None => false,
        };
        if found {
            self.sync()?;
        }
        Ok(found)
    }

    // -----------------------------------------------------------------
    // Timer and stamps
    // -----------------------------------------------------------------

    pub fn timer(&self) -> &SedationTimer {
        &self.timer
    }

    /// Start the sedation timer, gated on the safety time-out checklist.
    pub fn start_timer(&mut self) -> SessionResult<StartOutcome> {
        match self.timer.start(&self.record.plan.time_out) {
            Ok(effect) => {
                if effect.seed_pre_observation {
                    self.ledger.add_observation(0, self.clock.as_ref());
                }
                self.sync()?;
                Ok(StartOutcome::Started)
            }
            Err(_) => Ok(StartOutcome::BlockedByTimeOut),
        }
    }

    /// Start despite an incomplete checklist, after the user has been
    /// warned and has chosen to proceed.
    pub fn start_timer_override(&mut self) -> SessionResult<()> {
        let effect = self.timer.start_override();
        if effect.seed_pre_observation {
            self.ledger.add_observation(0, self.clock.as_ref());
        }
        self.sync()
    }

    /// Deliver one one-second tick from the host's scheduler.
    pub fn tick(&mut self) -> SessionResult<Option<TickEvent>> {
        let event = self.timer.tick();
        if event.is_some() {
            self.sync()?;
        }
        Ok(event)
    }

    pub fn stop_timer(&mut self) -> SessionResult<()> {
        self.timer.stop();
        self.sync()
    }

    /// Dismissing the reminder is display-only state; nothing to persist.
    pub fn dismiss_reminder(&mut self) {
        self.timer.dismiss_reminder();
    }

    pub fn stamps(&self) -> &ProcedureStamps {
        &self.stamps
    }

    /// Stamp the procedure-start time. Returns false once latched.
    pub fn stamp_procedure_start(&mut self) -> SessionResult<bool> {
        let stamped = self.stamps.procedure_start.stamp(self.clock.as_ref());
        if stamped {
            self.sync()?;
        }
        Ok(stamped)
    }

    /// Stamp the procedure-end time. Returns false once latched.
    pub fn stamp_procedure_end(&mut self) -> SessionResult<bool> {
        let stamped = self.stamps.procedure_end.stamp(self.clock.as_ref());
        if stamped {
            self.sync()?;
        }
        Ok(stamped)
    }

    /// Stamp the patient-awake time. Returns false once latched.
    pub fn stamp_patient_awake(&mut self) -> SessionResult<bool> {
        let stamped = self.stamps.patient_awake.stamp(self.clock.as_ref());
        if stamped {
            self.sync()?;
        }
        Ok(stamped)
    }

    // -----------------------------------------------------------------
    // Derived documents
    // -----------------------------------------------------------------

    /// The clinical log as last composed.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Compute, render and persist the dose advisory for the current
    /// weight and frailty flag. Fails without touching stored state when
    /// the weight is absent or non-positive.
    pub fn compute_dose_advisory(&mut self) -> SessionResult<String> {
        let advisory = advisor::compute(
            self.record.staff.weight_kg(),
            self.record.staff.frail_elderly,
        )?;
        let rendered = advisory.render();
        self.dose_advisory = Some(rendered.clone());
        self.dose_advisory_visible = true;
        self.sync()?;
        Ok(rendered)
    }

    pub fn dose_advisory(&self) -> Option<&str> {
        self.dose_advisory.as_deref()
    }

    pub fn dose_advisory_visible(&self) -> bool {
        self.dose_advisory_visible
    }

    /// Compose the discharge letter against the current record. Reads
    /// only; nothing is mutated or persisted.
    pub fn discharge_letter(&self) -> DischargeLetter {
        compose_discharge_letter(&self.record, &self.ledger, &self.stamps, self.clock.now())
    }

    // -----------------------------------------------------------------
    // Snapshot lifecycle
    // -----------------------------------------------------------------

    /// Capture the full session state as a snapshot.
    pub fn capture(&self) -> Snapshot {
        Snapshot {
            record: self.record.clone(),
            drugs: self.ledger.drugs().to_vec(),
            observations: self.ledger.observations().to_vec(),
            timer: self.timer.state(),
            stamps: self.stamps.clone(),
            dose_advisory: self.dose_advisory.clone(),
            dose_advisory_visible: self.dose_advisory_visible,
        }
    }

    /// Persist the current snapshot and re-render the clinical log. This
    /// is the single "something changed" hook; every mutating method
    /// ends here.
    pub fn sync(&mut self) -> SessionResult<()> {
        let snapshot = self.capture();
        self.store.persist(&snapshot)?;
        self.recompose();
        Ok(())
    }

    /// Delete the stored snapshot and reset all in-memory state: a full
    /// reset, not a rollback.
    pub fn clear(&mut self) -> SessionResult<()> {
        self.store.clear()?;
        self.record = SedationRecord::default();
        self.ledger = ObservationLedger::new();
        self.timer = SedationTimer::new();
        self.stamps = ProcedureStamps::default();
        self.dose_advisory = None;
        self.dose_advisory_visible = false;
        self.recompose();
        Ok(())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.record = snapshot.record;
        self.ledger.restore(snapshot.drugs, snapshot.observations);
        self.timer.restore(snapshot.timer);
        self.stamps = snapshot.stamps;
        self.dose_advisory = snapshot.dose_advisory;
        self.dose_advisory_visible = snapshot.dose_advisory_visible;
    }

    fn recompose(&mut self) {
        self.document = compose_clinical_log(
            &self.record,
            &self.ledger,
            &self.stamps,
            self.clock.now().date(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::timer::TimerPhase;
    use chrono::NaiveDate;

    fn clock() -> Box<FixedClock> {
        Box::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 14)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        ))
    }

    fn open_session() -> SedationSession {
        SedationSession::open(SnapshotStore::open_in_memory().unwrap(), clock()).unwrap()
    }

    #[test]
    fn test_open_empty_composes_initial_document() {
        let session = open_session();
        assert!(session.document().contains("SUMMARY:"));
        assert!(session.document().contains("No drugs recorded yet."));
    }

    #[test]
    fn test_field_edit_recomposes_document() {
        let mut session = open_session();
        session
            .update_record(|record| record.staff.procedure = "Hip relocation".into())
            .unwrap();
        assert!(session.document().contains("Hip relocation"));
    }

    #[test]
    fn test_add_drug_stamps_sedationist() {
        let mut session = open_session();
        session
            .update_record(|record| record.staff.sedationist = "Dr Okafor".into())
            .unwrap();
        session.add_drug("Propofol", "50").unwrap();

        let entry = &session.ledger().drugs()[0];
        assert_eq!(entry.recorded_by, "Dr Okafor");
        assert!(session.document().contains("- 14:30: Propofol 50 mg"));
    }

    #[test]
    fn test_capture_restore_is_observably_identity() {
        let mut session = open_session();
        session
            .update_record(|record| {
                record.staff.procedure = "Cardioversion".into();
                record.staff.weight = "70".into();
                record.plan.time_out.identity_confirmed = true;
            })
            .unwrap();
        session.add_drug("Ketamine", "30").unwrap();
        session.stamp_procedure_start().unwrap();

        let before = session.capture();
        let restored = before.clone();
        session.restore(restored);
        assert_eq!(session.capture(), before);
    }

    #[test]
    fn test_capture_is_idempotent_without_mutation() {
        let mut session = open_session();
        session.add_drug("Midazolam", "1").unwrap();
        let first = session.capture().to_json().unwrap();
        let second = session.capture().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_start_blocked_until_time_out_complete() {
        let mut session = open_session();
        assert_eq!(
            session.start_timer().unwrap(),
            StartOutcome::BlockedByTimeOut
        );
        assert_eq!(session.timer().phase(), TimerPhase::Idle);
        assert!(session.ledger().observations().is_empty());

        session.start_timer_override().unwrap();
        assert_eq!(session.timer().phase(), TimerPhase::Running);
        assert_eq!(session.ledger().observations()[0].time_label, "Pre");
    }

    #[test]
    fn test_start_seeds_pre_row_once() {
        let mut session = open_session();
        session
            .update_record(|record| {
                record.plan.time_out.identity_confirmed = true;
                record.plan.time_out.roles_assigned = true;
                record.plan.time_out.site_confirmed = true;
                record.plan.time_out.monitoring_active = true;
            })
            .unwrap();

        assert_eq!(session.start_timer().unwrap(), StartOutcome::Started);
        session.tick().unwrap();
        session.stop_timer().unwrap();
        assert_eq!(session.start_timer().unwrap(), StartOutcome::Started);

        let pre_rows = session
            .ledger()
            .observations()
            .iter()
            .filter(|o| o.time_label == "Pre")
            .count();
        assert_eq!(pre_rows, 1);
    }

    #[test]
    fn test_stamps_latch_once() {
        let mut session = open_session();
        assert!(session.stamp_procedure_end().unwrap());
        assert!(!session.stamp_procedure_end().unwrap());
        assert_eq!(session.stamps().procedure_end.label(), Some("14:30"));
        assert!(session.document().contains("End: 14:30"));
    }

    #[test]
    fn test_dose_advisory_requires_weight() {
        let mut session = open_session();
        assert!(matches!(
            session.compute_dose_advisory(),
            Err(SessionError::Advisor(AdvisorError::MissingWeight))
        ));
        assert!(session.dose_advisory().is_none());
        assert!(!session.dose_advisory_visible());

        session
            .update_record(|record| record.staff.weight = "70".into())
            .unwrap();
        let rendered = session.compute_dose_advisory().unwrap();
        assert!(rendered.contains("35-70 mg"));
        assert!(session.dose_advisory_visible());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = open_session();
        session.add_drug("Propofol", "40").unwrap();
        session.stamp_procedure_start().unwrap();
        session.clear().unwrap();

        assert!(session.ledger().drugs().is_empty());
        assert!(session.stamps().is_empty());
        assert_eq!(session.capture(), Snapshot::default());
        assert!(session.document().contains("No drugs recorded yet."));
    }

    #[test]
    fn test_observation_edit_persists() {
        let mut session = open_session();
        let id = session.add_observation().unwrap();
        let updated = session
            .update_observation(&id, |obs| obs.heart_rate = "72".into())
            .unwrap();
        assert!(updated);
        assert!(session.document().contains("HR 72"));

        let missing = session
            .update_observation("no-such-id", |obs| obs.heart_rate = "0".into())
            .unwrap();
        assert!(!missing);
    }
}
