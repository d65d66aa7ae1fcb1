//! The typed sedation record.
//!
//! One struct per logical section of the form. Free-text fields are plain
//! strings (empty = not provided), flags are booleans, and every
//! exclusive-choice group is an `Option` of an enum so "nothing selected
//! yet" is a distinct, valid state rather than a missing key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The full form state: every scalar field and flag, excluding the two
/// row tables (owned by the ledger) and the timer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SedationRecord {
    pub staff: StaffPatient,
    pub assessment: Assessment,
    pub plan: PlanSafety,
    pub outcome: OutcomeDischarge,
}

/// Section 1: staff and patient details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffPatient {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub patient_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub procedure: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub indication: String,
    #[serde(skip_serializing_if = "is_false")]
    pub senior_aware: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sedationist: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sedationist_grade: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub procedure_doctor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nurse: String,
    /// Weight in kg, as typed (parsed leniently when doses are computed).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub weight: String,
    #[serde(skip_serializing_if = "is_false")]
    pub weight_estimated: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
    #[serde(skip_serializing_if = "is_false")]
    pub frail_elderly: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allergies: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_analgesia: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_food: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_fluid: String,
}

impl StaffPatient {
    /// Weight parsed as a number, if the field holds one.
    pub fn weight_kg(&self) -> Option<f64> {
        crate::ledger::parse_numeric_prefix(&self.weight)
    }
}

/// Section 2: airway assessment, ASA grading, capacity and consent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mallampati: Option<Mallampati>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulbt: Option<UlbtGrade>,
    pub airway: AirwayFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asa: Option<AsaGrade>,
    #[serde(skip_serializing_if = "is_false")]
    pub asa_emergency: bool,
    pub contraindications: Contraindications,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    pub risks: RisksDiscussed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentType>,
    #[serde(skip_serializing_if = "is_false")]
    pub consent_leaflet: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub consent_questions: bool,
}

impl Assessment {
    /// ASA III, IV and V warrant a high-risk alert.
    pub fn asa_high_risk(&self) -> bool {
        matches!(
            self.asa,
            Some(AsaGrade::III) | Some(AsaGrade::IV) | Some(AsaGrade::V)
        )
    }

    /// A documented lack of capacity.
    pub fn capacity_lacking(&self) -> bool {
        self.capacity == Some(Capacity::No)
    }

    /// Rendered ASA grade: "-" when unselected, the grade otherwise, with
    /// an "E" suffix appended only when a grade is selected and the
    /// emergency flag is set.
    pub fn asa_display(&self) -> String {
        match self.asa {
            None => "-".to_string(),
            Some(grade) if self.asa_emergency => format!("{}E", grade),
            Some(grade) => grade.to_string(),
        }
    }

    /// True if any airway datum (Mallampati, ULBT or a flag) is present.
    pub fn has_airway_findings(&self) -> bool {
        self.mallampati.is_some() || self.ulbt.is_some() || self.airway.any()
    }
}

/// Section 3: sedation plan, pre-procedure vitals and safety checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSafety {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub agent: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_vital_hr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_vital_bp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_vital_spo2: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_vital_rr: String,
    pub soap_me: SoapMeChecklist,
    #[serde(skip_serializing_if = "is_false")]
    pub aagbi_monitoring: bool,
    pub time_out: TimeOutChecklist,
}

/// Section 4: outcome, disposal, discharge checks and sign-off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeDischarge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ProcedureOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposal: Option<Disposal>,
    pub discharge_checks: DischargeChecks,
    pub instructions: DischargeInstructions,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signoff_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signoff_gmc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signoff_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub complications: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Exclusive-choice groups
// ---------------------------------------------------------------------------

/// ASA physical status grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsaGrade {
    I,
    II,
    III,
    IV,
    V,
}

impl fmt::Display for AsaGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AsaGrade::I => "I",
            AsaGrade::II => "II",
            AsaGrade::III => "III",
            AsaGrade::IV => "IV",
            AsaGrade::V => "V",
        };
        f.write_str(s)
    }
}

/// Mallampati airway class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mallampati {
    I,
    II,
    III,
    IV,
}

impl fmt::Display for Mallampati {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mallampati::I => "I",
            Mallampati::II => "II",
            Mallampati::III => "III",
            Mallampati::IV => "IV",
        };
        f.write_str(s)
    }
}

/// Upper lip bite test grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UlbtGrade {
    I,
    II,
    III,
}

impl fmt::Display for UlbtGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UlbtGrade::I => "I",
            UlbtGrade::II => "II",
            UlbtGrade::III => "III",
        };
        f.write_str(s)
    }
}

/// Capacity determination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    Yes,
    No,
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capacity::Yes => "Yes",
            Capacity::No => "No",
        })
    }
}

/// How consent was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentType {
    Verbal,
    Written,
    BestInterests,
}

impl fmt::Display for ConsentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConsentType::Verbal => "Verbal",
            ConsentType::Written => "Written",
            ConsentType::BestInterests => "Best Interests",
        })
    }
}

/// Procedural outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcedureOutcome {
    Successful,
    PartialSuccess,
    Abandoned,
}

impl fmt::Display for ProcedureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcedureOutcome::Successful => "Successful",
            ProcedureOutcome::PartialSuccess => "Partial Success",
            ProcedureOutcome::Abandoned => "Abandoned",
        })
    }
}

/// Where the patient went afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposal {
    Home,
    Ward,
    Transfer,
}

impl fmt::Display for Disposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Disposal::Home => "Discharge Home",
            Disposal::Ward => "Admit to Ward",
            Disposal::Transfer => "Transfer",
        })
    }
}

// ---------------------------------------------------------------------------
// Flag groups
// ---------------------------------------------------------------------------

/// Difficult-airway indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirwayFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub mouth_opening_limited: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub tmd_short: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub neck_mobility_reduced: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub high_bmi: bool,
}

impl AirwayFlags {
    pub fn any(&self) -> bool {
        self.mouth_opening_limited || self.tmd_short || self.neck_mobility_reduced || self.high_bmi
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.mouth_opening_limited {
            out.push("Mouth Opening <3cm");
        }
        if self.tmd_short {
            out.push("TMD <6cm");
        }
        if self.neck_mobility_reduced {
            out.push("Neck Mobility Reduced");
        }
        if self.high_bmi {
            out.push("High BMI");
        }
        out
    }
}

/// Absolute contraindications to proceeding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contraindications {
    #[serde(skip_serializing_if = "is_false")]
    pub allergy: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub haemodynamic_instability: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub compromised_airway_gcs: bool,
}

impl Contraindications {
    pub fn any(&self) -> bool {
        self.allergy || self.haemodynamic_instability || self.compromised_airway_gcs
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.allergy {
            out.push("Allergy");
        }
        if self.haemodynamic_instability {
            out.push("Haemodynamic Instability");
        }
        if self.compromised_airway_gcs {
            out.push("Compromised Airway/GCS");
        }
        out
    }
}

/// Risks discussed during consent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RisksDiscussed {
    #[serde(skip_serializing_if = "is_false")]
    pub nausea: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub drowsiness: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hypotension: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub resp_depression: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub laryngospasm: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub aspiration: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub anaphylaxis: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub procedure_failure: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub further_treatment: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub emergence_reaction: bool,
}

impl RisksDiscussed {
    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.nausea {
            out.push("Nausea");
        }
        if self.drowsiness {
            out.push("Drowsiness");
        }
        if self.hypotension {
            out.push("Hypotension");
        }
        if self.resp_depression {
            out.push("Hypoxia");
        }
        if self.laryngospasm {
            out.push("Laryngospasm");
        }
        if self.aspiration {
            out.push("Aspiration");
        }
        if self.anaphylaxis {
            out.push("Anaphylaxis");
        }
        if self.procedure_failure {
            out.push("Proc Failure");
        }
        if self.further_treatment {
            out.push("Further Tx/Admission");
        }
        if self.emergence_reaction {
            out.push("Emergence Reaction");
        }
        out
    }
}

/// SOAP-ME equipment checklist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapMeChecklist {
    #[serde(skip_serializing_if = "is_false")]
    pub suction: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub oxygen: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub airway_equipment: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub monitoring: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub environment_iv: bool,
}

impl SoapMeChecklist {
    pub fn any(&self) -> bool {
        self.suction || self.oxygen || self.airway_equipment || self.monitoring || self.environment_iv
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.suction {
            out.push("Suction");
        }
        if self.oxygen {
            out.push("Oxygen/BVM");
        }
        if self.airway_equipment {
            out.push("Airway Equipment");
        }
        if self.monitoring {
            out.push("Monitoring");
        }
        if self.environment_iv {
            out.push("Environment/IV");
        }
        out
    }
}

/// Safety time-out checklist; all four items gate the sedation timer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOutChecklist {
    #[serde(skip_serializing_if = "is_false")]
    pub identity_confirmed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub roles_assigned: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub site_confirmed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub monitoring_active: bool,
}

impl TimeOutChecklist {
    pub fn is_complete(&self) -> bool {
        self.identity_confirmed && self.roles_assigned && self.site_confirmed && self.monitoring_active
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.identity_confirmed {
            out.push("Patient ID");
        }
        if self.roles_assigned {
            out.push("Roles Assigned");
        }
        if self.site_confirmed {
            out.push("Site/Side");
        }
        if self.monitoring_active {
            out.push("Monitoring Active");
        }
        out
    }
}

/// Discharge readiness checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DischargeChecks {
    #[serde(skip_serializing_if = "is_false")]
    pub vitals_baseline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub alert_orientated: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub tolerating_oral: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub pain_managed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub home_care_advice: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub reversal_wait: bool,
}

impl DischargeChecks {
    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.vitals_baseline {
            out.push("Vitals Baseline");
        }
        if self.alert_orientated {
            out.push("Alert/Orientated");
        }
        if self.tolerating_oral {
            out.push("Tol. Fluids");
        }
        if self.pain_managed {
            out.push("Pain Managed");
        }
        if self.home_care_advice {
            out.push("Home Care");
        }
        if self.reversal_wait {
            out.push("Reversal Wait OK");
        }
        out
    }
}

/// Written/verbal instructions given on discharge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DischargeInstructions {
    #[serde(skip_serializing_if = "is_false")]
    pub no_driving: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub accompanied: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_alcohol: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_legal_decisions: bool,
}

impl DischargeInstructions {
    pub fn any(&self) -> bool {
        self.no_driving || self.accompanied || self.no_alcohol || self.no_legal_decisions
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.no_driving {
            out.push("No Driving");
        }
        if self.accompanied {
            out.push("Accompanied");
        }
        if self.no_alcohol {
            out.push("No Alcohol");
        }
        if self.no_legal_decisions {
            out.push("No Legal Decisions");
        }
        out
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}
