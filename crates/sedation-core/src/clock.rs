//! Injected wall-clock capability.
//!
//! The engine never reads the system clock directly; every time-dependent
//! operation (timestamp labels, letter expiry windows, document dates)
//! takes a [`Clock`] so behavior is deterministically testable.

use chrono::NaiveDateTime;

/// Source of the current wall-clock date and time.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Production clock backed by the local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Format a timestamp as the two-digit `HH:MM` label used throughout the
/// record (drug rows, observation rows, one-shot stamps).
pub fn hhmm(at: NaiveDateTime) -> String {
    at.format("%H:%M").to_string()
}
