//! Record validation errors
//!
//! Everything that can be wrong with input handed over by the record store.
//! Validation fails fast: no partial report is ever produced from bad input.

use chrono::NaiveDate;
use thiserror::Error;

/// Malformed input detected at the engine boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Symptom intensity outside the 1-10 scale
    #[error("Intensity out of range for observation {id}: {intensity} (expected 1-10)")]
    IntensityOutOfRange { id: String, intensity: u8 },

    /// Cycle end date precedes its start date
    #[error("Cycle {id} ends before it starts: {end_date} < {start_date}")]
    EndBeforeStart {
        id: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    /// Symptom type name not in the closed enumeration
    #[error("Unknown symptom type: {0}")]
    UnknownSymptomType(String),

    /// Flow intensity name not in the closed enumeration
    #[error("Unknown flow intensity: {0}")]
    UnknownFlowIntensity(String),

    /// Cycles must be strictly ascending by start date
    #[error("Cycle {id} is out of order: starts on {start_date}, not after the previous cycle")]
    CyclesOutOfOrder { id: String, start_date: NaiveDate },

    /// Observations must be ascending by timestamp
    #[error("Observation {id} is out of order: timestamp precedes the previous observation")]
    ObservationsOutOfOrder { id: String },

    /// At most one cycle may lack an end date
    #[error("Multiple open cycles: {}", .0.join(", "))]
    MultipleOpenCycles(Vec<String>),
}

/// Result type alias for validation
pub type ValidationResult<T> = Result<T, ValidationError>;
