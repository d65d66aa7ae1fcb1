//! Sedation timer and one-shot procedure stamps.
//!
//! The timer never owns a thread: the host delivers one-second tick
//! events on the same execution context as user edits, so there is no
//! data race by construction. Elapsed time survives reload; the tick is
//! not restarted automatically after a restore.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::{hhmm, Clock};
use crate::models::TimeOutChecklist;

/// Persisted timer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerState {
    pub elapsed_secs: u64,
    pub running: bool,
}

/// Observable timer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Never started: elapsed 0, not running.
    Idle,
    /// Tick active, elapsed increasing.
    Running,
    /// Halted with elapsed retained; may be resumed.
    Stopped,
}

/// Raised when the safety time-out checklist is incomplete at start.
/// The caller may warn the user and proceed via [`SedationTimer::start_override`].
#[derive(Error, Debug, PartialEq, Eq)]
#[error("safety time-out checks are not fully completed")]
pub struct TimeOutIncomplete;

/// What a successful start requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartEffect {
    /// True when the timer started from zero elapsed: the caller must
    /// synchronously seed the baseline "Pre" observation row.
    pub seed_pre_observation: bool,
}

/// Result of one delivered tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEvent {
    pub elapsed_secs: u64,
    /// `HH:MM:SS`, formatted from elapsed seconds as a duration.
    pub display: String,
    /// True exactly at each 300-second milestone.
    pub reminder_due: bool,
}

/// The interval-driven elapsed-time counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SedationTimer {
    elapsed_secs: u64,
    running: bool,
    reminder: bool,
}

impl SedationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else if self.elapsed_secs == 0 {
            TimerPhase::Idle
        } else {
            TimerPhase::Stopped
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The "record observations" reminder: asserted at every 300-second
    /// milestone, held until dismissed or the timer stops.
    pub fn reminder_asserted(&self) -> bool {
        self.reminder
    }

    pub fn dismiss_reminder(&mut self) {
        self.reminder = false;
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn display(&self) -> String {
        let h = self.elapsed_secs / 3600;
        let m = (self.elapsed_secs % 3600) / 60;
        let s = self.elapsed_secs % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    /// Start (or resume) the timer, gated on the four safety time-out
    /// items. Resuming from a stop continues accumulating; it is not a
    /// reset.
    pub fn start(&mut self, time_out: &TimeOutChecklist) -> Result<StartEffect, TimeOutIncomplete> {
        if !time_out.is_complete() {
            return Err(TimeOutIncomplete);
        }
        Ok(self.start_override())
    }

    /// Start regardless of the checklist, after the caller has warned the
    /// user.
    pub fn start_override(&mut self) -> StartEffect {
        let seed = self.elapsed_secs == 0;
        self.running = true;
        StartEffect {
            seed_pre_observation: seed,
        }
    }

    /// Deliver one one-second tick. No-op unless running.
    pub fn tick(&mut self) -> Option<TickEvent> {
        if !self.running {
            return None;
        }
        self.elapsed_secs += 1;
        let reminder_due = self.elapsed_secs % 300 == 0;
        if reminder_due {
            self.reminder = true;
        }
        Some(TickEvent {
            elapsed_secs: self.elapsed_secs,
            display: self.display(),
            reminder_due,
        })
    }

    /// Halt the tick, clear any asserted reminder, retain elapsed time.
    pub fn stop(&mut self) {
        self.running = false;
        self.reminder = false;
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            elapsed_secs: self.elapsed_secs,
            running: self.running,
        }
    }

    /// Restore persisted state. The running flag is informational: no
    /// tick is delivered until the user starts the timer again.
    pub fn restore(&mut self, state: TimerState) {
        self.elapsed_secs = state.elapsed_secs;
        self.running = state.running;
        self.reminder = false;
    }
}

// ---------------------------------------------------------------------------
// One-shot stamps
// ---------------------------------------------------------------------------

/// A timestamp that may be set exactly once per record, then blocks
/// further changes — including after reload, via the persisted stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Latch {
    StampedAt(String),
    #[default]
    NotStamped,
}

impl Latch {
    /// Stamp the current wall-clock time. Returns false (and leaves the
    /// stamp untouched) if already stamped.
    pub fn stamp(&mut self, clock: &dyn Clock) -> bool {
        match self {
            Latch::NotStamped => {
                *self = Latch::StampedAt(hhmm(clock.now()));
                true
            }
            Latch::StampedAt(_) => false,
        }
    }

    pub fn is_stamped(&self) -> bool {
        matches!(self, Latch::StampedAt(_))
    }

    pub fn is_not_stamped(&self) -> bool {
        !self.is_stamped()
    }

    /// The stamped `HH:MM` label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Latch::StampedAt(at) => Some(at),
            Latch::NotStamped => None,
        }
    }
}

/// The three intra-procedure one-shot stamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureStamps {
    #[serde(skip_serializing_if = "Latch::is_not_stamped")]
    pub procedure_start: Latch,
    #[serde(skip_serializing_if = "Latch::is_not_stamped")]
    pub procedure_end: Latch,
    #[serde(skip_serializing_if = "Latch::is_not_stamped")]
    pub patient_awake: Latch,
}

impl ProcedureStamps {
    pub fn is_empty(&self) -> bool {
        self.procedure_start.is_not_stamped()
            && self.procedure_end.is_not_stamped()
            && self.patient_awake.is_not_stamped()
    }
}
