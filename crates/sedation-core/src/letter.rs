//! Discharge letter composition.
//!
//! Pure view-model: the record, the set of drugs given and a reference
//! clock time in; patient-facing letter fields out, including the
//! 24-hour recovery window and drug-class-conditional advisory lines.
//! Nothing is mutated and nothing is persisted.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::ledger::{parse_numeric_prefix, ObservationLedger};
use crate::models::SedationRecord;
use crate::timer::ProcedureStamps;

const BLANK_NAME_LINE: &str = "______________________";

const EFFECT_TIRED: &str =
    "You may feel tired, dizzy, or unsteady on your feet. Take it easy and rest.";
const EFFECT_AMNESIA: &str =
    "You may not remember much about the procedure (Amnesia). This is normal.";
const EFFECT_KETAMINE: &str = "Ketamine can cause vivid dreams or 'daydreams' as it wears off. A quiet, calm environment helps this pass naturally.";
const EFFECT_OPIOID: &str = "You may feel a little nauseous or itchy. This usually settles quickly.";
const EFFECT_GENERIC_NAUSEA: &str =
    "You may feel a little nauseous. Eat light meals and drink plenty of water.";
const EFFECT_CANNULA: &str = "If your cannula site (where the needle was) becomes red, hot, or swollen, please seek medical advice.";

/// Patient-facing letter fields, ready for display or print.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeLetter {
    /// Long-form letter date, e.g. "14 March 2024".
    pub letter_date: String,
    pub patient_name: String,
    pub procedure: String,
    /// Distinct drugs joined with " & ", or "Sedation" when none given.
    pub drugs_given: String,
    pub side_effects: Vec<String>,
    /// Start of the 24-hour recovery window.
    pub window_start_time: String,
    pub window_start_date: String,
    /// End of the 24-hour recovery window.
    pub window_end_time: String,
    pub window_end_date: String,
}

/// Compose the discharge letter against a reference clock time.
pub fn compose_discharge_letter(
    record: &SedationRecord,
    ledger: &ObservationLedger,
    stamps: &ProcedureStamps,
    now: NaiveDateTime,
) -> DischargeLetter {
    let drug_names = ledger.drug_names();
    let drugs_given = if drug_names.is_empty() {
        "Sedation".to_string()
    } else {
        drug_names.join(" & ")
    };

    let has_ketamine = drug_names
        .iter()
        .any(|name| name.to_lowercase().contains("ketamine"));
    let has_opioid = drug_names.iter().any(|name| {
        let lower = name.to_lowercase();
        lower.contains("fentanyl") || lower.contains("morphine")
    });

    let mut side_effects = vec![EFFECT_TIRED.to_string(), EFFECT_AMNESIA.to_string()];
    if has_ketamine {
        side_effects.push(EFFECT_KETAMINE.to_string());
    }
    if has_opioid {
        side_effects.push(EFFECT_OPIOID.to_string());
    } else {
        side_effects.push(EFFECT_GENERIC_NAUSEA.to_string());
    }
    side_effects.push(EFFECT_CANNULA.to_string());

    let window_start = now.date().and_time(base_time(record, stamps, now));
    let window_end = window_start + Duration::hours(24);

    let patient_name = if record.staff.patient_name.is_empty() {
        BLANK_NAME_LINE.to_string()
    } else {
        record.staff.patient_name.clone()
    };
    let procedure = if record.staff.procedure.is_empty() {
        "Procedure".to_string()
    } else {
        record.staff.procedure.clone()
    };

    DischargeLetter {
        letter_date: now.format("%-d %B %Y").to_string(),
        patient_name,
        procedure,
        drugs_given,
        side_effects,
        window_start_time: window_start.format("%H:%M").to_string(),
        window_start_date: window_start.format("%-d %b").to_string(),
        window_end_time: window_end.format("%H:%M").to_string(),
        window_end_date: window_end.format("%-d %b").to_string(),
    }
}

/// The recovery window starts at the procedure-end stamp, falling back to
/// the sign-off time field, then to the reference clock. A field that
/// does not parse as `HH:MM` also falls back to the clock.
fn base_time(record: &SedationRecord, stamps: &ProcedureStamps, now: NaiveDateTime) -> NaiveTime {
    let candidate = stamps
        .procedure_end
        .label()
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            let signoff = record.outcome.signoff_time.trim();
            (!signoff.is_empty()).then(|| signoff.to_string())
        });

    candidate
        .and_then(|text| parse_hhmm(&text))
        .unwrap_or_else(|| now.time())
}

fn parse_hhmm(text: &str) -> Option<NaiveTime> {
    let mut parts = text.splitn(2, ':');
    let hours = parse_numeric_prefix(parts.next()?.trim())? as u32;
    let minutes = parse_numeric_prefix(parts.next()?.trim())? as u32;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}
