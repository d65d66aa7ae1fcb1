//! Clinical log composition.
//!
//! A pure, idempotent mapping from the record, the ledger tables and the
//! procedure stamps to one rich-text document: summary line, dated
//! heading, then five numbered sections in a fixed order. Re-rendering
//! with unchanged inputs yields byte-identical output.

mod markup;
mod sections;

use chrono::NaiveDate;

use crate::ledger::ObservationLedger;
use crate::models::SedationRecord;
use crate::timer::ProcedureStamps;

/// Render the full clinical log.
pub fn compose_clinical_log(
    record: &SedationRecord,
    ledger: &ObservationLedger,
    stamps: &ProcedureStamps,
    today: NaiveDate,
) -> String {
    let mut doc = String::new();
    doc.push_str(&sections::summary_line(
        &record.staff,
        &record.outcome,
        &ledger.drug_totals(),
    ));
    doc.push_str(&sections::record_header(today));
    doc.push_str(&sections::staff_patient(&record.staff));
    doc.push_str(&sections::assessment_consent(&record.assessment));
    doc.push_str(&sections::plan_safety(&record.plan));
    doc.push_str(&sections::intra_procedure(
        stamps,
        ledger.drugs(),
        ledger.observations(),
        &record.outcome.complications,
        &record.outcome.notes,
    ));
    doc.push_str(&sections::outcome_discharge(&record.outcome));
    doc
}
