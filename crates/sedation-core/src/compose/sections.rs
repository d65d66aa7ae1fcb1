//! Section renderers for the clinical log.
//!
//! Each renderer is a pure function of a narrowed view of the record, so
//! every section is testable on its own. Headings are always emitted;
//! missing values render as inline placeholders, never as dropped lines.

use std::fmt::Display;

use chrono::NaiveDate;

use super::markup::{
    bold, bold_color, italic, or_placeholder, summary_label, underline, ALERT_RED, BR,
    CONFIRM_GREEN,
};
use crate::ledger::DrugTotal;
use crate::models::{
    Assessment, DrugEntry, ObservationEntry, OutcomeDischarge, PlanSafety, StaffPatient,
};
use crate::timer::ProcedureStamps;

fn opt_text<T: Display>(value: Option<T>, placeholder: &str) -> String {
    match value {
        Some(v) => v.to_string(),
        None => placeholder.to_string(),
    }
}

/// Top summary line: procedure, indication, outcome and drug totals with
/// inferred units.
pub(crate) fn summary_line(
    staff: &StaffPatient,
    outcome: &OutcomeDischarge,
    totals: &[DrugTotal],
) -> String {
    let drugs_summary = if totals.is_empty() {
        "None Recorded".to_string()
    } else {
        totals
            .iter()
            .map(DrugTotal::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = String::new();
    out.push_str(&summary_label("SUMMARY:"));
    out.push(' ');
    out.push_str(&format!(
        "{} for {}. ",
        or_placeholder(&staff.procedure, "Procedure"),
        or_placeholder(&staff.indication, "...")
    ));
    out.push_str(&bold(&opt_text(outcome.outcome, "Outcome Pending")));
    out.push_str(". ");
    out.push_str(&format!("Total Drugs: {}", bold(&drugs_summary)));
    out.push_str(BR);
    out.push_str(BR);
    out
}

/// Dated record heading and rule.
pub(crate) fn record_header(today: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&bold(&format!(
        "PROCEDURAL SEDATION RECORD ({})",
        today.format("%d %b %Y")
    )));
    out.push_str(BR);
    out.push_str("----------------------------------------------------------");
    out.push_str(BR);
    out
}

/// Section 1: staff and patient.
pub(crate) fn staff_patient(s: &StaffPatient) -> String {
    let mut out = String::new();
    out.push_str(&bold("1. Staff & Patient"));
    out.push_str(BR);
    out.push_str(&format!(
        "Procedure: {}{}",
        bold(or_placeholder(&s.procedure, "Not specified")),
        BR
    ));
    out.push_str(&format!(
        "Indication: {}{}",
        or_placeholder(&s.indication, "Not specified"),
        BR
    ));

    if s.senior_aware {
        out.push_str(&bold_color(CONFIRM_GREEN, "✓ Senior in Department Aware"));
        out.push_str(BR);
    }

    out.push_str(&format!(
        "Sedationist: {} ({}){}",
        or_placeholder(&s.sedationist, "..."),
        or_placeholder(&s.sedationist_grade, "Grade"),
        BR
    ));
    out.push_str(&format!(
        "Proc. Dr: {} | Nurse: {}{}",
        or_placeholder(&s.procedure_doctor, "..."),
        or_placeholder(&s.nurse, "..."),
        BR
    ));

    let estimated = if s.weight_estimated { "(Est)" } else { "" };
    out.push_str(&format!(
        "Weight: {} kg {} | Age: {} yrs{}",
        or_placeholder(&s.weight, "--"),
        estimated,
        or_placeholder(&s.age, "--"),
        BR
    ));

    if s.frail_elderly {
        out.push_str(&italic("Patient flagged as Frail / >65"));
        out.push_str(BR);
    }

    out.push_str(&format!(
        "Allergies: {}{}",
        bold_color(ALERT_RED, or_placeholder(&s.allergies, "None Known")),
        BR
    ));
    out.push_str(&format!(
        "Pre-Analgesia: {}{}",
        or_placeholder(&s.pre_analgesia, "None"),
        BR
    ));
    out.push_str(&format!(
        "Fasting: Food ({}) | Fluid ({}){}{}",
        or_placeholder(&s.last_food, "--:--"),
        or_placeholder(&s.last_fluid, "--:--"),
        BR,
        BR
    ));
    out
}

/// Section 2: assessment and consent.
pub(crate) fn assessment_consent(a: &Assessment) -> String {
    let mut out = String::new();
    out.push_str(&bold("2. Assessment & Consent"));
    out.push_str(BR);

    if a.has_airway_findings() {
        let flags = a.airway.labels();
        let flags_text = if flags.is_empty() {
            "None".to_string()
        } else {
            flags.join(", ")
        };
        out.push_str(&format!(
            "Airway: Mallampati {} | ULBT {} | Flags: {}{}",
            opt_text(a.mallampati, "-"),
            opt_text(a.ulbt, "-"),
            flags_text,
            BR
        ));
    }

    out.push_str(&format!("ASA Grade: {}{}", bold(&a.asa_display()), BR));

    if a.contraindications.any() {
        out.push_str(&bold_color(
            ALERT_RED,
            &format!(
                "CONTRAINDICATIONS NOTED: {}",
                a.contraindications.labels().join(", ")
            ),
        ));
        out.push_str(BR);
    }

    out.push_str(&format!("Capacity: {}{}", opt_text(a.capacity, "Yes"), BR));

    let risks = a.risks.labels();
    let risks_text = if risks.is_empty() {
        "None documented".to_string()
    } else {
        risks.join(", ")
    };
    out.push_str(&format!("Risks Discussed: {}{}", risks_text, BR));
    out.push_str(&format!("Consent: {}{}", opt_text(a.consent, "..."), BR));

    let mut extras = Vec::new();
    if a.consent_leaflet {
        extras.push("Leaflet Given");
    }
    if a.consent_questions {
        extras.push("Questions Answered");
    }
    if !extras.is_empty() {
        out.push_str(&format!("Consent Notes: {}{}", extras.join(", "), BR));
    }
    out
}

/// Section 3: plan and safety checks.
pub(crate) fn plan_safety(p: &PlanSafety) -> String {
    let mut out = String::new();
    out.push_str(BR);
    out.push_str(&bold("3. Plan & Safety"));
    out.push_str(BR);
    out.push_str(&format!(
        "Target: {} | Agent: {}{}",
        or_placeholder(&p.target, "..."),
        or_placeholder(&p.agent, "..."),
        BR
    ));
    out.push_str(&format!(
        "Pre-Vitals: HR {} | BP {} | SpO2 {}% | RR {} {}",
        or_placeholder(&p.pre_vital_hr, "-"),
        or_placeholder(&p.pre_vital_bp, "-"),
        or_placeholder(&p.pre_vital_spo2, "-"),
        or_placeholder(&p.pre_vital_rr, "-"),
        BR
    ));

    if p.soap_me.any() {
        out.push_str(&format!(
            "Checklist (SOAP-ME): {}{}",
            p.soap_me.labels().join(", "),
            BR
        ));
    }

    if p.aagbi_monitoring {
        out.push_str("Monitoring: AAGBI Standards + Waveform Capnography Confirmed");
        out.push_str(BR);
    }

    let time_out = p.time_out.labels();
    let time_out_text = if time_out.is_empty() {
        "None Recorded".to_string()
    } else {
        time_out.join(", ")
    };
    out.push_str(&format!("Safety Time Out: {}{}", time_out_text, BR));
    out
}

/// Section 4: intra-procedure log — stamps, drug table, observation
/// table, complications and notes.
///
/// The drug lines always carry a literal "mg" suffix, even for drugs the
/// summary reports in micrograms. That mismatch is longstanding charting
/// behavior and is kept as-is.
pub(crate) fn intra_procedure(
    stamps: &ProcedureStamps,
    drugs: &[DrugEntry],
    observations: &[ObservationEntry],
    complications: &str,
    notes: &str,
) -> String {
    let mut out = String::new();
    out.push_str(BR);
    out.push_str(&bold("4. Intra-Procedure Log"));
    out.push_str(BR);
    out.push_str(&format!(
        "Proc Start: {} | End: {} | Awake: {}{}",
        stamps.procedure_start.label().unwrap_or("--:--"),
        stamps.procedure_end.label().unwrap_or("--:--"),
        stamps.patient_awake.label().unwrap_or("--:--"),
        BR
    ));

    if drugs.is_empty() {
        out.push_str(&italic("No drugs recorded yet."));
        out.push_str(BR);
    } else {
        out.push_str(&underline("Drugs Given:"));
        out.push_str(BR);
        for entry in drugs {
            out.push_str(&format!(
                "- {}: {} {} mg{}",
                entry.time_label, entry.name, entry.dose, BR
            ));
        }
    }

    if !observations.is_empty() {
        out.push_str(&underline("Observations:"));
        out.push_str(BR);
        for obs in observations {
            if !obs.has_vitals() {
                continue;
            }
            out.push_str(&format!(
                "- {}: HR {}, BP {}, SpO2 {}%, RR {}{}",
                obs.time_label, obs.heart_rate, obs.blood_pressure, obs.spo2, obs.respiratory_rate, BR
            ));
        }
    }

    if !complications.is_empty() {
        out.push_str(BR);
        out.push_str(&bold_color(ALERT_RED, "COMPLICATIONS & INTERVENTION:"));
        out.push_str(BR);
        out.push_str(complications);
        out.push_str(BR);
    }

    if !notes.is_empty() {
        out.push_str(BR);
        out.push_str(&format!("{} {}", bold("Notes:"), notes));
        out.push_str(BR);
    }

    out.push_str(BR);
    out
}

/// Section 5: outcome and discharge.
pub(crate) fn outcome_discharge(o: &OutcomeDischarge) -> String {
    let mut out = String::new();
    out.push_str(&bold("5. Outcome & Discharge"));
    out.push_str(BR);
    out.push_str(&format!("Outcome: {}{}", opt_text(o.outcome, "..."), BR));
    out.push_str(&format!("Disposal: {}{}", opt_text(o.disposal, "..."), BR));

    let checks = o.discharge_checks.labels();
    let checks_text = if checks.is_empty() {
        "None Checked".to_string()
    } else {
        checks.join(", ")
    };
    out.push_str(&format!("Discharge Checks: {}{}", checks_text, BR));

    if o.instructions.any() {
        out.push_str(&format!(
            "Instructions Given: {}{}",
            o.instructions.labels().join(", "),
            BR
        ));
    }

    if !o.signoff_name.is_empty() || !o.signoff_gmc.is_empty() {
        out.push_str(BR);
        out.push_str(&format!(
            "{} {} (GMC: {}) @ {}",
            bold("Signed Off By:"),
            o.signoff_name,
            o.signoff_gmc,
            o.signoff_time
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ledger::ObservationLedger;
    use crate::models::{AsaGrade, Capacity, ConsentType, Disposal, ProcedureOutcome};
    use crate::timer::Latch;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 14)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_summary_defaults() {
        let rendered = summary_line(&StaffPatient::default(), &OutcomeDischarge::default(), &[]);
        assert!(rendered.contains("Procedure for ..."));
        assert!(rendered.contains("Outcome Pending"));
        assert!(rendered.contains("None Recorded"));
    }

    #[test]
    fn test_summary_joins_totals_with_units() {
        let mut ledger = ObservationLedger::new();
        ledger.add_drug("Ketamine", "20", "Dr A", &clock());
        ledger.add_drug("Fentanyl", "25", "Dr A", &clock());
        ledger.add_drug("Ketamine", "10", "Dr A", &clock());

        let mut outcome = OutcomeDischarge::default();
        outcome.outcome = Some(ProcedureOutcome::Successful);

        let rendered = summary_line(&StaffPatient::default(), &outcome, &ledger.drug_totals());
        assert!(rendered.contains("Ketamine 30mg, Fentanyl 25mcg"));
        assert!(rendered.contains("Successful"));
    }

    #[test]
    fn test_record_header_date() {
        let rendered = record_header(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert!(rendered.contains("PROCEDURAL SEDATION RECORD (14 Mar 2024)"));
        assert!(rendered.contains("----"));
    }

    #[test]
    fn test_staff_patient_placeholders() {
        let rendered = staff_patient(&StaffPatient::default());
        assert!(rendered.contains("Procedure: "));
        assert!(rendered.contains("Not specified"));
        assert!(rendered.contains("Weight: -- kg "));
        assert!(rendered.contains("Allergies: "));
        assert!(rendered.contains("None Known"));
        assert!(rendered.contains("Fasting: Food (--:--) | Fluid (--:--)"));
        assert!(!rendered.contains("Senior in Department"));
        assert!(!rendered.contains("Frail"));
    }

    #[test]
    fn test_staff_patient_flags() {
        let mut staff = StaffPatient::default();
        staff.weight = "70".into();
        staff.weight_estimated = true;
        staff.frail_elderly = true;
        staff.senior_aware = true;
        staff.allergies = "Penicillin".into();

        let rendered = staff_patient(&staff);
        assert!(rendered.contains("Weight: 70 kg (Est)"));
        assert!(rendered.contains("Patient flagged as Frail / >65"));
        assert!(rendered.contains("✓ Senior in Department Aware"));
        assert!(rendered.contains("Penicillin"));
        assert!(!rendered.contains("None Known"));
    }

    #[test]
    fn test_airway_line_omitted_without_findings() {
        let rendered = assessment_consent(&Assessment::default());
        assert!(!rendered.contains("Airway:"));
        assert!(rendered.contains("ASA Grade: "));
        assert!(rendered.contains("Capacity: Yes"));
        assert!(rendered.contains("Risks Discussed: None documented"));
        assert!(!rendered.contains("CONTRAINDICATIONS"));
        assert!(!rendered.contains("Consent Notes"));
    }

    #[test]
    fn test_airway_line_present_with_single_flag() {
        let mut assessment = Assessment::default();
        assessment.airway.high_bmi = true;
        let rendered = assessment_consent(&assessment);
        assert!(rendered.contains("Airway: Mallampati - | ULBT - | Flags: High BMI"));
    }

    #[test]
    fn test_asa_emergency_suffix_in_section() {
        let mut assessment = Assessment::default();
        assessment.asa = Some(AsaGrade::III);
        assessment.asa_emergency = true;
        assert!(assessment_consent(&assessment).contains(">IIIE<"));

        assessment.asa = None;
        let rendered = assessment_consent(&assessment);
        assert!(!rendered.contains('E'));
    }

    #[test]
    fn test_contraindications_and_consent() {
        let mut assessment = Assessment::default();
        assessment.contraindications.haemodynamic_instability = true;
        assessment.capacity = Some(Capacity::No);
        assessment.consent = Some(ConsentType::BestInterests);
        assessment.consent_leaflet = true;

        let rendered = assessment_consent(&assessment);
        assert!(rendered.contains("CONTRAINDICATIONS NOTED: Haemodynamic Instability"));
        assert!(rendered.contains("Capacity: No"));
        assert!(rendered.contains("Consent: Best Interests"));
        assert!(rendered.contains("Consent Notes: Leaflet Given"));
    }

    #[test]
    fn test_plan_safety_defaults() {
        let rendered = plan_safety(&PlanSafety::default());
        assert!(rendered.contains("Target: ... | Agent: ..."));
        assert!(rendered.contains("Pre-Vitals: HR - | BP - | SpO2 -% | RR -"));
        assert!(!rendered.contains("SOAP-ME"));
        assert!(!rendered.contains("AAGBI"));
        assert!(rendered.contains("Safety Time Out: None Recorded"));
    }

    #[test]
    fn test_plan_safety_checklists() {
        let mut plan = PlanSafety::default();
        plan.soap_me.suction = true;
        plan.soap_me.monitoring = true;
        plan.aagbi_monitoring = true;
        plan.time_out.identity_confirmed = true;
        plan.time_out.site_confirmed = true;

        let rendered = plan_safety(&plan);
        assert!(rendered.contains("Checklist (SOAP-ME): Suction, Monitoring"));
        assert!(rendered.contains("AAGBI Standards + Waveform Capnography Confirmed"));
        assert!(rendered.contains("Safety Time Out: Patient ID, Site/Side"));
    }

    #[test]
    fn test_intra_procedure_empty_tables() {
        let rendered = intra_procedure(&ProcedureStamps::default(), &[], &[], "", "");
        assert!(rendered.contains("Proc Start: --:-- | End: --:-- | Awake: --:--"));
        assert!(rendered.contains("No drugs recorded yet."));
        assert!(!rendered.contains("Observations:"));
    }

    #[test]
    fn test_intra_procedure_drug_rows_keep_fixed_mg_suffix() {
        let mut ledger = ObservationLedger::new();
        ledger.add_drug("Fentanyl", "25", "Dr A", &clock());

        let rendered = intra_procedure(&ProcedureStamps::default(), ledger.drugs(), &[], "", "");
        // Per-row rendering says "mg" even though the summary line reports
        // fentanyl totals in mcg.
        assert!(rendered.contains("- 14:30: Fentanyl 25 mg"));
        assert!(!rendered.contains("25 mcg"));
    }

    #[test]
    fn test_intra_procedure_skips_blank_observations() {
        let mut ledger = ObservationLedger::new();
        ledger.add_observation(0, &clock());
        let filled = ledger.add_observation(300, &clock());
        let obs = ledger.observation_mut(&filled).unwrap();
        obs.heart_rate = "80".into();
        obs.blood_pressure = "120/70".into();
        obs.spo2 = "98".into();
        obs.respiratory_rate = "14".into();

        let rendered =
            intra_procedure(&ProcedureStamps::default(), &[], ledger.observations(), "", "");
        assert!(rendered.contains("Observations:"));
        assert!(rendered.contains("- T+5m (14:30): HR 80, BP 120/70, SpO2 98%, RR 14"));
        assert!(!rendered.contains("- Pre:"));
    }

    #[test]
    fn test_intra_procedure_stamps_and_notes() {
        let stamps = ProcedureStamps {
            procedure_start: Latch::StampedAt("10:00".into()),
            procedure_end: Latch::StampedAt("10:25".into()),
            patient_awake: Latch::NotStamped,
        };
        let rendered = intra_procedure(&stamps, &[], &[], "Brief apnoea, responded to jaw thrust", "Tolerated well");
        assert!(rendered.contains("Proc Start: 10:00 | End: 10:25 | Awake: --:--"));
        assert!(rendered.contains("COMPLICATIONS & INTERVENTION:"));
        assert!(rendered.contains("Brief apnoea"));
        assert!(rendered.contains("Tolerated well"));
    }

    #[test]
    fn test_outcome_discharge_defaults() {
        let rendered = outcome_discharge(&OutcomeDischarge::default());
        assert!(rendered.contains("Outcome: ..."));
        assert!(rendered.contains("Disposal: ..."));
        assert!(rendered.contains("Discharge Checks: None Checked"));
        assert!(!rendered.contains("Instructions Given"));
        assert!(!rendered.contains("Signed Off By"));
    }

    #[test]
    fn test_outcome_discharge_signoff_requires_name_or_gmc() {
        let mut outcome = OutcomeDischarge::default();
        outcome.signoff_time = "15:00".into();
        assert!(!outcome_discharge(&outcome).contains("Signed Off By"));

        outcome.signoff_gmc = "1234567".into();
        let rendered = outcome_discharge(&outcome);
        assert!(rendered.contains("Signed Off By:"));
        assert!(rendered.contains("(GMC: 1234567) @ 15:00"));
    }

    #[test]
    fn test_outcome_discharge_full() {
        let mut outcome = OutcomeDischarge::default();
        outcome.outcome = Some(ProcedureOutcome::PartialSuccess);
        outcome.disposal = Some(Disposal::Ward);
        outcome.discharge_checks.vitals_baseline = true;
        outcome.discharge_checks.pain_managed = true;
        outcome.instructions.no_driving = true;
        outcome.instructions.accompanied = true;

        let rendered = outcome_discharge(&outcome);
        assert!(rendered.contains("Outcome: Partial Success"));
        assert!(rendered.contains("Disposal: Admit to Ward"));
        assert!(rendered.contains("Discharge Checks: Vitals Baseline, Pain Managed"));
        assert!(rendered.contains("Instructions Given: No Driving, Accompanied"));
    }
}
