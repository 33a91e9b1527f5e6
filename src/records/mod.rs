//! Cadence record model
//!
//! Input-side types handed over by the record store:
//!
//! - **types**: `SymptomObservation`, `CycleRecord` and their closed enums
//! - **snapshot**: validated, ordered view that the analyzers consume
//! - **error**: boundary validation errors
//!
//! All validation happens here, synchronously, before any analysis runs.

pub mod error;
pub mod snapshot;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use snapshot::{RawSnapshot, Snapshot};
pub use types::{
    CycleRecord, FlowIntensity, SymptomObservation, SymptomType, MAX_INTENSITY, MIN_INTENSITY,
};
