//! The durable snapshot.
//!
//! Capture records only what is set: false flags, empty text fields and
//! unselected groups are omitted from the JSON, and restore treats an
//! absent key as the field's default. Capturing after a restore
//! reproduces the same bytes.

use serde::{Deserialize, Serialize};

use crate::models::{DrugEntry, ObservationEntry, SedationRecord};
use crate::timer::{ProcedureStamps, TimerState};

/// Serialized form of the full session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub record: SedationRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drugs: Vec<DrugEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<ObservationEntry>,
    pub timer: TimerState,
    #[serde(skip_serializing_if = "ProcedureStamps::is_empty")]
    pub stamps: ProcedureStamps,
    /// Last rendered dose advisory, exactly as shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_advisory: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub dose_advisory_visible: bool,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}
