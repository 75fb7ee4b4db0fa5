//! Error types for the bodymetrics application.

use thiserror::Error;

use crate::domain::Region;

/// Errors that can occur when parsing user input or loading threshold tables.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("cannot read file: {0}")]
    CannotRead(String),

    #[error("invalid tables file format: {0}")]
    InvalidFormat(String),

    #[error("invalid threshold table for {region}: {reason}")]
    InvalidTable {
        region: String,
        #[source]
        reason: TableError,
    },

    #[error("unknown sex: {0} (expected male or female)")]
    UnknownSex(String),

    #[error("unknown region: {0} (expected general, asian, pacific-islander or custom)")]
    UnknownRegion(String),
}

/// Reasons a list of bands cannot form a threshold table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("table has no bands")]
    Empty,

    #[error("first band must start at 0, starts at {0}")]
    NonZeroStart(f64),

    #[error("band {0} has a non-finite lower bound")]
    NonFiniteLow(usize),

    #[error("band {0} uses the reserved Unknown category")]
    ReservedCategory(usize),

    #[error("only the last band may be open-ended (band {0})")]
    OpenEndedBeforeLast(usize),

    #[error("last band must be open-ended")]
    ClosedTerminalBand,

    #[error("band {index} upper bound {high} must exceed lower bound {low}")]
    EmptyBand { index: usize, low: f64, high: f64 },

    #[error("band {index} ends at {high} but the next band starts at {next_low}")]
    Discontinuous {
        index: usize,
        high: f64,
        next_low: f64,
    },

    #[error("table must contain exactly one Normal band, found {0}")]
    NormalBandCount(usize),
}

/// Errors that can occur while classifying a measurement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("invalid input: {field} must be a positive number, got {value}")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("missing input: {0} is required for this estimate")]
    MissingInput(&'static str),

    #[error("no threshold table registered for region {0}")]
    UnknownRegion(Region),
}

impl ClassifyError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::InvalidInput { .. } => "invalid_input",
            ClassifyError::MissingInput(_) => "missing_input",
            ClassifyError::UnknownRegion(_) => "unknown_region",
        }
    }
}
