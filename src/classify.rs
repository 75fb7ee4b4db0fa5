//! Measurement classification engine.
//!
//! Takes a validated [`Measurement`], computes BMI and the derived ratios,
//! classifies BMI against the region's threshold table and composes the
//! combined-risk advisory. Every call is a pure function of its inputs and
//! the registry it is given.

use serde::Serialize;

use crate::domain::{Advisory, Category, Measurement, Region, Severity, Sex, WaistRisk};
use crate::error::ClassifyError;
use crate::formulas::{
    calculate_bmi, calculate_whr, calculate_whtr, estimate_body_fat, require_positive, round_to,
    weight_range_for_bmi,
};
use crate::thresholds::RegionTables;

/// Waist above which males are at high risk (cm).
const MALE_WAIST_LIMIT_CM: f64 = 102.0;

/// Waist above which females are at high risk (cm).
const FEMALE_WAIST_LIMIT_CM: f64 = 88.0;

/// Cut points used by the combined advisory.
mod advisory {
    pub const ELEVATED_BMI: f64 = 25.0;
    pub const CENTRAL_WAIST_CM: f64 = 102.0;
    pub const CENTRAL_WHR: f64 = 0.9;
}

/// Result of the sex-specific waist check, with its display message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaistAssessment {
    pub risk: WaistRisk,
    pub message: String,
}

/// Healthy weight range for the measured height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IdealWeightRange {
    pub low_kg: f64,
    /// Exclusive ceiling: weights at or above it fall in the next band.
    pub high_kg: f64,
}

/// Everything computed for one measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub region: Region,
    /// BMI rounded to 1 decimal.
    pub bmi: f64,
    pub category: Category,
    pub severity: Severity,
    pub whtr: Option<f64>,
    pub whr: Option<f64>,
    pub waist_risk: Option<WaistAssessment>,
    pub body_fat_pct: Option<f64>,
    pub ideal_weight_range: IdealWeightRange,
    pub advisory: Option<Advisory>,
}

/// Assesses obesity risk from waist circumference alone.
///
/// Used when height is unknown. Males above 102 cm and females above 88 cm
/// are flagged as high risk.
pub fn assess_waist_only_risk(waist_cm: f64, sex: Sex) -> WaistAssessment {
    match sex {
        Sex::Male if waist_cm > MALE_WAIST_LIMIT_CM => WaistAssessment {
            risk: WaistRisk::High,
            message: format!(
                "High risk: Waist above {} cm for males",
                MALE_WAIST_LIMIT_CM
            ),
        },
        Sex::Female if waist_cm > FEMALE_WAIST_LIMIT_CM => WaistAssessment {
            risk: WaistRisk::High,
            message: format!(
                "High risk: Waist above {} cm for females",
                FEMALE_WAIST_LIMIT_CM
            ),
        },
        _ => WaistAssessment {
            risk: WaistRisk::WithinHealthyRange,
            message: "Waist circumference is within healthy range".to_string(),
        },
    }
}

/// Validating wrapper around [`assess_waist_only_risk`] for raw caller input.
pub fn assess_waist(waist_cm: f64, sex: Option<Sex>) -> Result<WaistAssessment, ClassifyError> {
    let waist_cm = require_positive("waist_cm", waist_cm)?;
    let sex = sex.ok_or(ClassifyError::MissingInput("sex"))?;
    Ok(assess_waist_only_risk(waist_cm, sex))
}

/// Picks the combined-risk advisory. Rules are checked in order and the
/// first match wins.
///
/// # Arguments
/// * `bmi` - Unrounded BMI
/// * `is_muscular` - Whether the user is muscular or athletic
/// * `waist_cm` - Waist circumference, if known
/// * `whr` - Unrounded waist-to-hip ratio, if known
pub fn advise(
    bmi: f64,
    is_muscular: bool,
    waist_cm: Option<f64>,
    whr: Option<f64>,
) -> Option<Advisory> {
    use self::advisory::{CENTRAL_WAIST_CM, CENTRAL_WHR, ELEVATED_BMI};

    let lean_whr = whr.is_none_or(|r| r < CENTRAL_WHR);
    let lean_waist = waist_cm.is_none_or(|w| w < CENTRAL_WAIST_CM);
    let central_obesity =
        waist_cm.is_some_and(|w| w >= CENTRAL_WAIST_CM) || whr.is_some_and(|r| r >= CENTRAL_WHR);

    if is_muscular && bmi >= ELEVATED_BMI && lean_whr && lean_waist {
        Some(Advisory::LikelyMuscleMass)
    } else if bmi < ELEVATED_BMI && central_obesity {
        Some(Advisory::NormalBmiCentralObesity)
    } else if bmi >= ELEVATED_BMI && central_obesity {
        Some(Advisory::OverweightCentralObesity)
    } else {
        None
    }
}

/// Classification engine bound to a set of region tables.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tables: RegionTables,
}

impl Classifier {
    pub fn new(tables: RegionTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &RegionTables {
        &self.tables
    }

    /// Classifies one measurement.
    ///
    /// All inputs are validated before anything is computed; on error no
    /// partial result is returned.
    pub fn classify(&self, m: &Measurement) -> Result<ClassificationResult, ClassifyError> {
        let bmi = calculate_bmi(m.height_cm, m.weight_kg)?;
        let waist_cm = m
            .waist_cm
            .map(|w| require_positive("waist_cm", w))
            .transpose()?;
        let hip_cm = m
            .hip_cm
            .map(|h| require_positive("hip_cm", h))
            .transpose()?;
        let table = self.tables.get(m.region)?;

        let bmi_display = round_to(bmi, 1);
        let body_fat_pct = if m.estimate_body_fat {
            Some(estimate_body_fat(bmi_display, m.age, m.sex, m.is_muscular)?)
        } else {
            None
        };

        let (category, severity) = table.classify(bmi);

        let whtr = waist_cm.and_then(|w| calculate_whtr(w, m.height_cm));
        let whr_raw = waist_cm
            .zip(hip_cm)
            .and_then(|(w, h)| calculate_whr(w, h));
        let waist_risk = waist_cm
            .zip(m.sex)
            .map(|(w, sex)| assess_waist_only_risk(w, sex));

        let (normal_low, normal_high) = table.normal_range();
        let (low_kg, high_kg) = weight_range_for_bmi(m.height_cm, normal_low, normal_high);

        let advisory = advise(bmi, m.is_muscular, waist_cm, whr_raw);

        log::debug!(
            "Classified BMI {:.2} as {} ({} profile), advisory: {:?}",
            bmi,
            category,
            m.region,
            advisory.map(|a| a.tag())
        );

        Ok(ClassificationResult {
            region: m.region,
            bmi: bmi_display,
            category,
            severity,
            whtr,
            whr: whr_raw.map(|r| round_to(r, 2)),
            waist_risk,
            body_fat_pct,
            ideal_weight_range: IdealWeightRange { low_kg, high_kg },
            advisory,
        })
    }
}

/// Classifies a measurement against the built-in region tables.
pub fn classify(m: &Measurement) -> Result<ClassificationResult, ClassifyError> {
    Classifier::default().classify(m)
}
