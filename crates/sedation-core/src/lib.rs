//! Sedation-Core Library
//!
//! Local-first procedural-sedation record engine: a typed form state, a
//! durable single-slot snapshot store, and deterministic derived
//! documents.
//!
//! # Architecture
//!
//! ```text
//! field edit / row add / tick
//!             │
//!             ▼
//!     SedationSession ──── capture ────► Snapshot ───► SnapshotStore
//!             │                                         (SQLite slot)
//!             │ recompose
//!             ▼
//!     ClinicalLogComposer ───► rich-text document (copy/paste to EPR)
//!
//!     DoseAdvisor        weight + frailty ───► dose ranges (persisted)
//!     DischargeLetter    record + drug set ──► letter view-model
//!     SedationTimer      host-delivered ticks, 300 s reminder cadence
//! ```
//!
//! # Core Principle
//!
//! **Mutate → persist → recompose.** Every mutating operation writes the
//! full snapshot and re-renders the clinical log before returning, so
//! the durable slot and the displayed document can never drift apart.
//!
//! # Modules
//!
//! - [`models`]: Domain types (SedationRecord, DrugEntry, ObservationEntry, etc.)
//! - [`store`]: SQLite snapshot slot with tolerant restore
//! - [`ledger`]: The two ordered row tables and per-drug totals
//! - [`advisor`]: Weight-based dose advisory
//! - [`compose`]: Clinical log composition (rich text, fixed sections)
//! - [`letter`]: Discharge letter with the 24-hour recovery window
//! - [`timer`]: Sedation timer and one-shot procedure stamps
//! - [`session`]: Orchestration of the mutate → persist → recompose cycle
//! - [`clock`]: Injected wall-clock capability

pub mod advisor;
pub mod clock;
pub mod compose;
pub mod ledger;
pub mod letter;
pub mod models;
pub mod session;
pub mod store;
pub mod timer;

// Re-export commonly used types
pub use advisor::{AdvisorError, DoseAdvisory};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compose::compose_clinical_log;
pub use ledger::{DoseUnit, DrugTotal, ObservationLedger};
pub use letter::{compose_discharge_letter, DischargeLetter};
pub use models::{
    AsaGrade, Capacity, ConsentType, Disposal, DrugEntry, EntryId, ObservationEntry,
    ProcedureOutcome, SedationRecord,
};
pub use session::{SedationSession, SessionError, SessionResult, StartOutcome};
pub use store::{Snapshot, SnapshotStore, StoreError, StoreResult};
pub use timer::{Latch, ProcedureStamps, SedationTimer, TimerPhase, TimerState};
