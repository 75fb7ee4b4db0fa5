//! Domain types for body measurements and their classification.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::formulas::{feet_inches_to_cm, pounds_to_kg};

/// Biological sex, used by the waist-risk and body fat formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Returns the display name for the sex.
    pub fn display_name(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl FromStr for Sex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(ParseError::UnknownSex(s.to_string())),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Population profile selecting which BMI threshold table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    #[default]
    General,
    Asian,
    PacificIslander,
    Custom,
}

impl Region {
    /// Returns all region variants.
    pub fn all() -> &'static [Region] {
        &[
            Region::General,
            Region::Asian,
            Region::PacificIslander,
            Region::Custom,
        ]
    }

    /// Returns the display name for the region.
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::General => "General",
            Region::Asian => "Asian",
            Region::PacificIslander => "Pacific Islander",
            Region::Custom => "Custom",
        }
    }

    /// Returns the key used for the region in tables files and the HTTP API.
    pub fn key(&self) -> &'static str {
        match self {
            Region::General => "general",
            Region::Asian => "asian",
            Region::PacificIslander => "pacific-islander",
            Region::Custom => "custom",
        }
    }
}

impl FromStr for Region {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Region::General),
            "asian" => Ok(Region::Asian),
            "pacific-islander" | "pacific islander" | "pacificislander" | "pacific" => {
                Ok(Region::PacificIslander)
            }
            "custom" => Ok(Region::Custom),
            _ => Err(ParseError::UnknownRegion(s.to_string())),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// BMI category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Underweight,
    Normal,
    Overweight,
    Obese,
    /// No band matched. Only reachable through an invalid table or a
    /// non-finite BMI.
    Unknown,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::Normal => "Normal",
            Category::Overweight => "Overweight",
            Category::Obese => "Obese",
            Category::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Severity tag attached to a BMI band, used by renderers to pick a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Caution,
    Alert,
}

/// Outcome of the sex-specific waist circumference check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaistRisk {
    High,
    WithinHealthyRange,
}

/// Supplementary message combining BMI with waist, hip and muscularity signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// BMI is elevated but central measurements are lean.
    LikelyMuscleMass,
    /// BMI is below 25 yet waist or WHR indicate central obesity.
    NormalBmiCentralObesity,
    /// BMI is elevated and waist or WHR confirm central obesity.
    OverweightCentralObesity,
}

impl Advisory {
    pub fn tag(&self) -> &'static str {
        match self {
            Advisory::LikelyMuscleMass => "likely_muscle_mass",
            Advisory::NormalBmiCentralObesity => "normal_bmi_central_obesity",
            Advisory::OverweightCentralObesity => "overweight_central_obesity",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Advisory::LikelyMuscleMass => {
                "Elevated BMI is likely due to muscle mass rather than excess fat."
            }
            Advisory::NormalBmiCentralObesity => {
                "BMI is in the normal range but central-obesity indicators are present."
            }
            Advisory::OverweightCentralObesity => {
                "Overweight with central obesity: elevated health risk."
            }
        }
    }
}

impl Serialize for Advisory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Advisory", 2)?;
        state.serialize_field("tag", self.tag())?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

/// Height as entered, before normalization to centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightInput {
    Centimeters(f64),
    /// Feet may be fractional (5.3 ft); inches are added on top.
    FeetInches { feet: f64, inches: f64 },
}

impl HeightInput {
    pub fn to_cm(&self) -> f64 {
        match *self {
            HeightInput::Centimeters(cm) => cm,
            HeightInput::FeetInches { feet, inches } => feet_inches_to_cm(feet, inches),
        }
    }
}

/// Weight as entered, before normalization to kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInput {
    Kilograms(f64),
    Pounds(f64),
}

impl WeightInput {
    pub fn to_kg(&self) -> f64 {
        match *self {
            WeightInput::Kilograms(kg) => kg,
            WeightInput::Pounds(lb) => pounds_to_kg(lb),
        }
    }
}

/// One set of body measurements, built once per evaluation.
///
/// Height and weight are always present and stored in canonical metric
/// units. Everything else is optional and independent.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub hip_cm: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub region: Region,
    pub is_muscular: bool,
    /// Opt-in for the body fat estimate, which needs age and sex.
    pub estimate_body_fat: bool,
}

impl Measurement {
    /// Creates a measurement from metric height and weight with no optional data.
    pub fn new(height_cm: f64, weight_kg: f64) -> Self {
        Self {
            height_cm,
            weight_kg,
            waist_cm: None,
            hip_cm: None,
            age: None,
            sex: None,
            region: Region::General,
            is_muscular: false,
            estimate_body_fat: false,
        }
    }

    /// Creates a measurement from unit-tagged inputs, normalizing to metric.
    pub fn from_inputs(height: HeightInput, weight: WeightInput) -> Self {
        Self::new(height.to_cm(), weight.to_kg())
    }

    pub fn with_waist(mut self, waist_cm: f64) -> Self {
        self.waist_cm = Some(waist_cm);
        self
    }

    pub fn with_hip(mut self, hip_cm: f64) -> Self {
        self.hip_cm = Some(hip_cm);
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn muscular(mut self, is_muscular: bool) -> Self {
        self.is_muscular = is_muscular;
        self
    }

    pub fn with_body_fat_estimate(mut self) -> Self {
        self.estimate_body_fat = true;
        self
    }
}
