//! Row types for the two dynamic tables.

use serde::{Deserialize, Serialize};

/// Identity of a row in either table.
pub type EntryId = String;

/// One administered drug. Insertion order is administration order; rows
/// are never reordered and never mutated in place after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugEntry {
    /// Row identity (UUID).
    pub id: EntryId,
    /// Wall-clock `HH:MM` label stamped at creation.
    pub time_label: String,
    /// Drug name, as resolved by the caller.
    pub name: String,
    /// Dose exactly as entered; parsed leniently only for totals.
    pub dose: String,
    /// Operator name stamped from the record at creation.
    pub recorded_by: String,
}

impl DrugEntry {
    pub fn new(time_label: String, name: String, dose: String, recorded_by: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            time_label,
            name,
            dose,
            recorded_by,
        }
    }
}

/// One vital-signs observation. Cells are clinically entered free text,
/// mutable after creation; the time label is derived once at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationEntry {
    /// Row identity (UUID).
    pub id: EntryId,
    /// `Pre` for the baseline row, else `T+<minutes>m (<HH:MM>)`.
    pub time_label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub heart_rate: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub blood_pressure: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spo2: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub respiratory_rate: String,
    /// Early-warning-score sub-selection, copied from the template
    /// ([`EwsSelection::default`]) when the row is created.
    #[serde(default)]
    pub ews: EwsSelection,
}

impl ObservationEntry {
    pub fn new(time_label: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            time_label,
            heart_rate: String::new(),
            blood_pressure: String::new(),
            spo2: String::new(),
            respiratory_rate: String::new(),
            ews: EwsSelection::default(),
        }
    }

    /// True if at least one vital cell is non-empty; rows failing this are
    /// skipped by the narrative renderer.
    pub fn has_vitals(&self) -> bool {
        !self.heart_rate.is_empty()
            || !self.blood_pressure.is_empty()
            || !self.spo2.is_empty()
            || !self.respiratory_rate.is_empty()
    }
}

/// Early-warning-score selection attached to an observation row. The
/// default value is the template every new row copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EwsSelection {
    /// Selected score band, if the clinician has picked one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drug_entry_ids_are_unique() {
        let a = DrugEntry::new("12:00".into(), "Propofol".into(), "50".into(), "Dr A".into());
        let b = DrugEntry::new("12:00".into(), "Propofol".into(), "50".into(), "Dr A".into());
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 36);
    }

    #[test]
    fn test_observation_has_vitals() {
        let mut obs = ObservationEntry::new("Pre".into());
        assert!(!obs.has_vitals());
        obs.spo2 = "98".into();
        assert!(obs.has_vitals());
    }

    #[test]
    fn test_new_observation_copies_template() {
        let obs = ObservationEntry::new("Pre".into());
        assert_eq!(obs.ews, EwsSelection::default());
    }
}
