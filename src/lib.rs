//! Body measurement classification.
//!
//! Computes BMI, waist-to-height and waist-to-hip ratios, a body fat estimate
//! and a combined central-obesity advisory from one set of measurements,
//! classifying BMI against region-specific threshold tables.

pub mod chart;
pub mod classify;
pub mod domain;
pub mod error;
pub mod formulas;
pub mod server;
pub mod thresholds;

pub use classify::{ClassificationResult, Classifier, classify};
pub use domain::{Measurement, Region, Sex};
pub use error::{ClassifyError, ParseError, TableError};
