//! Weight-based drug-dose advisory.
//!
//! Pure computation: patient weight + frailty flag in, initial bolus
//! ranges out. The rendered advisory is persisted with the snapshot so it
//! survives reload exactly as last shown.

use thiserror::Error;

/// Advisory errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("weight is required for dose calculation")]
    MissingWeight,
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Computed dose ranges for one patient.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseAdvisory {
    pub weight_kg: f64,
    pub frail: bool,
    /// Propofol initial bolus, whole milligrams.
    pub propofol_low_mg: u32,
    pub propofol_high_mg: u32,
    /// Ketamine dissociative dose, whole milligrams.
    pub ketamine_dissociative_low_mg: u32,
    pub ketamine_dissociative_high_mg: u32,
    /// Ketamine analgesic dose, one decimal place.
    pub ketamine_analgesic_low_mg: f64,
    pub ketamine_analgesic_high_mg: f64,
    /// Midazolam adjunct: fixed 1 mg lower bound; upper bound capped at
    /// 2.0 mg regardless of weight, one decimal place.
    pub midazolam_low_mg: f64,
    pub midazolam_high_mg: f64,
    /// Fentanyl adjunct ceiling (not a range), whole micrograms.
    pub fentanyl_max_mcg: u32,
}

/// Compute the advisory for a patient. Weight must be present and
/// positive; there is no silent default.
pub fn compute(weight_kg: Option<f64>, frail: bool) -> AdvisorResult<DoseAdvisory> {
    let w = match weight_kg {
        Some(w) if w > 0.0 => w,
        _ => return Err(AdvisorError::MissingWeight),
    };

    let (propofol_low, propofol_high) = if frail {
        (0.25 * w, 0.50 * w)
    } else {
        (0.50 * w, 1.00 * w)
    };

    Ok(DoseAdvisory {
        weight_kg: w,
        frail,
        propofol_low_mg: round_whole(propofol_low),
        propofol_high_mg: round_whole(propofol_high),
        ketamine_dissociative_low_mg: round_whole(1.0 * w),
        ketamine_dissociative_high_mg: round_whole(2.0 * w),
        ketamine_analgesic_low_mg: round_tenth(0.3 * w),
        ketamine_analgesic_high_mg: round_tenth(0.5 * w),
        midazolam_low_mg: 1.0,
        midazolam_high_mg: round_tenth(f64::min(2.0, 0.05 * w)),
        fentanyl_max_mcg: round_whole(0.5 * w),
    })
}

impl DoseAdvisory {
    /// Render the advisory block shown to the clinician and persisted in
    /// the snapshot.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.frail {
            out.push_str(&format!(
                "<p><strong>Propofol (Frail/Elderly):</strong> {}-{} mg (0.25-0.5 mg/kg IV)</p>\n",
                self.propofol_low_mg, self.propofol_high_mg
            ));
        } else {
            out.push_str(&format!(
                "<p><strong>Propofol (Adult):</strong> {}-{} mg (0.5-1.0 mg/kg IV)</p>\n",
                self.propofol_low_mg, self.propofol_high_mg
            ));
        }
        out.push_str(&format!(
            "<p><strong>Ketamine (Dissociative):</strong> {}-{} mg (1-2 mg/kg IV)</p>\n",
            self.ketamine_dissociative_low_mg, self.ketamine_dissociative_high_mg
        ));
        out.push_str(&format!(
            "<p><strong>Ketamine (Analgesia):</strong> {:.1}-{:.1} mg (0.3-0.5 mg/kg IV)</p>\n",
            self.ketamine_analgesic_low_mg, self.ketamine_analgesic_high_mg
        ));
        let (mid_low, mid_high) = self.midazolam_bounds();
        out.push_str(&format!(
            "<p><strong>Midazolam (Adjunct):</strong> {}-{} mg (Initial 1-2 mg; max 2.5 mg single dose)</p>\n",
            mid_low, mid_high
        ));
        out.push_str(&format!(
            "<p><strong>Fentanyl (Adjunct):</strong> Up to {} mcg (Up to 0.5 mcg/kg IV with sedatives)</p>\n",
            self.fentanyl_max_mcg
        ));
        out.push_str("<span>All doses are initial bolus ranges. Titrate slowly to effect.</span>");
        out
    }

    /// Rendered midazolam bounds, always ordered low-to-high. For very
    /// light patients the weight-derived cap falls below the fixed 1 mg
    /// starting dose and the pair is swapped for display.
    fn midazolam_bounds(&self) -> (String, String) {
        let fixed = "1".to_string();
        let capped = format!("{:.1}", self.midazolam_high_mg);
        if self.midazolam_high_mg < self.midazolam_low_mg {
            (capped, fixed)
        } else {
            (fixed, capped)
        }
    }
}

/// Half-up rounding to whole units.
fn round_whole(value: f64) -> u32 {
    value.round() as u32
}

/// Half-up rounding to one decimal place.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_weight_is_an_error() {
        assert_eq!(compute(None, false), Err(AdvisorError::MissingWeight));
        assert_eq!(compute(Some(0.0), false), Err(AdvisorError::MissingWeight));
        assert_eq!(compute(Some(-5.0), true), Err(AdvisorError::MissingWeight));
    }

    #[test]
    fn test_seventy_kg_adult() {
        let advisory = compute(Some(70.0), false).unwrap();
        assert_eq!(advisory.propofol_low_mg, 35);
        assert_eq!(advisory.propofol_high_mg, 70);
        assert_eq!(advisory.ketamine_dissociative_low_mg, 70);
        assert_eq!(advisory.ketamine_dissociative_high_mg, 140);
        assert_eq!(advisory.ketamine_analgesic_low_mg, 21.0);
        assert_eq!(advisory.ketamine_analgesic_high_mg, 35.0);
        // 0.05 * 70 = 3.5 exceeds the 2.0 mg ceiling.
        assert_eq!(advisory.midazolam_high_mg, 2.0);
        assert_eq!(advisory.fentanyl_max_mcg, 35);

        let rendered = advisory.render();
        assert!(rendered.contains("35-70 mg"));
        assert!(rendered.contains("70-140 mg"));
        assert!(rendered.contains("1-2.0 mg"));
        assert!(rendered.contains("Up to 35 mcg"));
        assert!(rendered.contains("Propofol (Adult)"));
    }

    #[test]
    fn test_frail_halves_propofol() {
        let advisory = compute(Some(80.0), true).unwrap();
        assert_eq!(advisory.propofol_low_mg, 20);
        assert_eq!(advisory.propofol_high_mg, 40);
        assert!(advisory.render().contains("Propofol (Frail/Elderly)"));
    }

    #[test]
    fn test_rounding_half_up() {
        // 0.5 * 73 = 36.5 rounds up to 37.
        let advisory = compute(Some(73.0), false).unwrap();
        assert_eq!(advisory.propofol_low_mg, 37);
        // 0.3 * 71 = 21.3 stays at one decimal.
        let advisory = compute(Some(71.0), false).unwrap();
        assert_eq!(advisory.ketamine_analgesic_low_mg, 21.3);
    }

    #[test]
    fn test_light_patient_midazolam_renders_low_to_high() {
        let advisory = compute(Some(10.0), false).unwrap();
        assert_eq!(advisory.midazolam_high_mg, 0.5);
        assert!(advisory.render().contains("0.5-1 mg"));
    }

    #[test]
    fn test_midazolam_boundary_at_twenty_kg() {
        let advisory = compute(Some(20.0), false).unwrap();
        assert_eq!(advisory.midazolam_high_mg, 1.0);
        assert!(advisory.render().contains("1-1.0 mg"));
    }

    #[test]
    fn test_monotonic_in_weight() {
        let lighter = compute(Some(40.0), false).unwrap();
        let heavier = compute(Some(90.0), false).unwrap();
        assert!(heavier.propofol_low_mg >= lighter.propofol_low_mg);
        assert!(heavier.propofol_high_mg >= lighter.propofol_high_mg);
        assert!(heavier.ketamine_dissociative_high_mg >= lighter.ketamine_dissociative_high_mg);
        assert!(heavier.ketamine_analgesic_low_mg >= lighter.ketamine_analgesic_low_mg);
        assert!(heavier.midazolam_high_mg >= lighter.midazolam_high_mg);
        assert!(heavier.fentanyl_max_mcg >= lighter.fentanyl_max_mcg);
    }
}
