//! Anthropometric formulas: unit conversion, BMI, body ratios and body fat.

use crate::domain::Sex;
use crate::error::ClassifyError;

/// Centimeters per foot.
pub const CM_PER_FOOT: f64 = 30.48;

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Kilograms per pound.
pub const KG_PER_POUND: f64 = 0.453592;

/// Deurenberg-style body fat coefficients.
mod body_fat {
    pub const BMI: f64 = 1.20;
    pub const AGE: f64 = 0.23;
    pub const MALE: f64 = 10.8;
    pub const INTERCEPT: f64 = 5.4;
    /// Deducted for muscular users, whose BMI overstates adiposity.
    pub const MUSCULAR_ADJUSTMENT: f64 = 5.0;
}

/// Converts a height in feet and inches to centimeters.
///
/// Feet may be fractional; no rounding is applied.
pub fn feet_inches_to_cm(feet: f64, inches: f64) -> f64 {
    feet * CM_PER_FOOT + inches * CM_PER_INCH
}

/// Converts a weight in pounds to kilograms without rounding.
pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_POUND
}

/// Rounds a value to the given number of decimal places for display.
///
/// Exact halves round to the even neighbour, so 22.25 becomes 22.2.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Checks that a measurement is finite and strictly positive.
pub fn require_positive(field: &'static str, value: f64) -> Result<f64, ClassifyError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ClassifyError::InvalidInput { field, value })
    }
}

/// Calculates Body Mass Index.
///
/// Formula:
/// ```text
/// BMI = weight_kg / (height_cm / 100)²
/// ```
///
/// The value is returned unrounded so that classification is not skewed by
/// display rounding near band edges.
///
/// # Arguments
/// * `height_cm` - Height in centimeters
/// * `weight_kg` - Weight in kilograms
///
/// # Returns
/// BMI, or `InvalidInput` if either input is not a positive number
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> Result<f64, ClassifyError> {
    let height_cm = require_positive("height_cm", height_cm)?;
    let weight_kg = require_positive("weight_kg", weight_kg)?;

    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Calculates waist-to-height ratio, rounded to 2 decimals.
///
/// Returns None if height is not positive.
pub fn calculate_whtr(waist_cm: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    Some(round_to(waist_cm / height_cm, 2))
}

/// Calculates the unrounded waist-to-hip ratio.
///
/// Returns None if hip is not positive.
pub fn calculate_whr(waist_cm: f64, hip_cm: f64) -> Option<f64> {
    if hip_cm <= 0.0 {
        return None;
    }
    Some(waist_cm / hip_cm)
}

/// Estimates body fat percentage from BMI, age and sex.
///
/// Formula:
/// ```text
/// BF% = 1.20 × BMI + 0.23 × age - 10.8 × sex_factor - 5.4
/// ```
/// where `sex_factor` is 1 for males and 0 for females. Muscular users get
/// 5 points deducted, floored at 0.
///
/// # Arguments
/// * `bmi` - Body Mass Index (display-rounded)
/// * `age` - Age in years
/// * `sex` - Biological sex
/// * `is_muscular` - Whether the user is muscular or athletic
///
/// # Returns
/// Estimated BF% rounded to 1 decimal, or `MissingInput` if age or sex is absent
pub fn estimate_body_fat(
    bmi: f64,
    age: Option<u32>,
    sex: Option<Sex>,
    is_muscular: bool,
) -> Result<f64, ClassifyError> {
    let age = age.ok_or(ClassifyError::MissingInput("age"))?;
    let sex = sex.ok_or(ClassifyError::MissingInput("sex"))?;

    let sex_factor = match sex {
        Sex::Male => 1.0,
        Sex::Female => 0.0,
    };

    let mut bf = body_fat::BMI * bmi + body_fat::AGE * age as f64
        - body_fat::MALE * sex_factor
        - body_fat::INTERCEPT;

    if is_muscular {
        bf = (bf - body_fat::MUSCULAR_ADJUSTMENT).max(0.0);
    }

    Ok(round_to(bf, 1))
}

/// Calculates the weight range corresponding to a BMI range at a given height.
///
/// Both bounds are rounded to 1 decimal.
pub fn weight_range_for_bmi(height_cm: f64, low_bmi: f64, high_bmi: f64) -> (f64, f64) {
    let height_m = height_cm / 100.0;
    let h2 = height_m * height_m;
    (round_to(low_bmi * h2, 1), round_to(high_bmi * h2, 1))
}
