//! The observation ledger: owner of the drug-administration and
//! vital-signs tables.
//!
//! Rows are appended in chronological order and removed by identity;
//! removal never renumbers or re-times the remaining rows.

use std::fmt;

use crate::clock::{hhmm, Clock};
use crate::models::{DrugEntry, EntryId, ObservationEntry};

/// Display unit for a drug total. Fentanyl is charted in micrograms,
/// everything else in milligrams. This is a fixed lexical rule keyed on
/// the drug name, not a configurable unit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseUnit {
    Mg,
    Mcg,
}

impl DoseUnit {
    /// Infer the display unit from a drug name (case-insensitive
    /// substring match on "fentanyl").
    pub fn infer(drug_name: &str) -> Self {
        if drug_name.to_lowercase().contains("fentanyl") {
            DoseUnit::Mcg
        } else {
            DoseUnit::Mg
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoseUnit::Mg => "mg",
            DoseUnit::Mcg => "mcg",
        })
    }
}

/// Summed dose for one drug name (exact, case-sensitive grouping).
#[derive(Debug, Clone, PartialEq)]
pub struct DrugTotal {
    pub name: String,
    pub total: f64,
    pub unit: DoseUnit,
}

impl fmt::Display for DrugTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.name, self.total, self.unit)
    }
}

/// The two ordered row tables. The snapshot carries their rows verbatim;
/// the ledger itself never touches the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationLedger {
    drugs: Vec<DrugEntry>,
    observations: Vec<ObservationEntry>,
}

impl ObservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drug row stamped with the current wall-clock time.
    pub fn add_drug(
        &mut self,
        name: &str,
        dose: &str,
        recorded_by: &str,
        clock: &dyn Clock,
    ) -> EntryId {
        let entry = DrugEntry::new(
            hhmm(clock.now()),
            name.to_string(),
            dose.to_string(),
            recorded_by.to_string(),
        );
        let id = entry.id.clone();
        self.drugs.push(entry);
        id
    }

    /// Remove a drug row by identity. Returns false if no such row.
    pub fn remove_drug(&mut self, id: &str) -> bool {
        let before = self.drugs.len();
        self.drugs.retain(|d| d.id != id);
        self.drugs.len() != before
    }

    /// Append an observation row. The time label is `Pre` for the
    /// baseline row (elapsed == 0), otherwise `T+<minutes>m (<HH:MM>)`.
    pub fn add_observation(&mut self, elapsed_secs: u64, clock: &dyn Clock) -> EntryId {
        let label = if elapsed_secs == 0 {
            "Pre".to_string()
        } else {
            format!("T+{}m ({})", elapsed_secs / 60, hhmm(clock.now()))
        };
        let entry = ObservationEntry::new(label);
        let id = entry.id.clone();
        self.observations.push(entry);
        id
    }

    /// Remove an observation row by identity. Returns false if no such row.
    pub fn remove_observation(&mut self, id: &str) -> bool {
        let before = self.observations.len();
        self.observations.retain(|o| o.id != id);
        self.observations.len() != before
    }

    /// Mutable access to one observation row for per-cell edits.
    pub fn observation_mut(&mut self, id: &str) -> Option<&mut ObservationEntry> {
        self.observations.iter_mut().find(|o| o.id == id)
    }

    pub fn drugs(&self) -> &[DrugEntry] {
        &self.drugs
    }

    pub fn observations(&self) -> &[ObservationEntry] {
        &self.observations
    }

    /// Per-drug dose totals in first-appearance order. Doses that do not
    /// parse as numbers count as zero toward the total; the original text
    /// stays on the row untouched.
    pub fn drug_totals(&self) -> Vec<DrugTotal> {
        let mut totals: Vec<DrugTotal> = Vec::new();
        for entry in &self.drugs {
            let dose = match parse_numeric_prefix(&entry.dose) {
                Some(value) => value,
                None => {
                    tracing::debug!(dose = %entry.dose, drug = %entry.name, "unparsable dose counted as 0");
                    0.0
                }
            };
            match totals.iter_mut().find(|t| t.name == entry.name) {
                Some(total) => total.total += dose,
                None => totals.push(DrugTotal {
                    name: entry.name.clone(),
                    total: dose,
                    unit: DoseUnit::infer(&entry.name),
                }),
            }
        }
        totals
    }

    /// Distinct drug names in first-appearance order (for the discharge
    /// letter's drug set).
    pub fn drug_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.drugs {
            if !names.contains(&entry.name.as_str()) {
                names.push(&entry.name);
            }
        }
        names
    }

    /// Replace both tables wholesale (snapshot restore path).
    pub fn restore(&mut self, drugs: Vec<DrugEntry>, observations: Vec<ObservationEntry>) {
        self.drugs = drugs;
        self.observations = observations;
    }
}

/// Lenient numeric parse: the longest leading `[+-]?digits[.digits]`
/// prefix, after trimming whitespace. Returns None when no digit is
/// present.
pub fn parse_numeric_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end].parse().ok()
}
