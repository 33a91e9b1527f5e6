//! Validated, immutable view of a user's records
//!
//! A `Snapshot` is the only input the analytics engine accepts. Building one
//! checks every record invariant plus the ordering guarantees the analyzers
//! rely on, so a snapshot that exists is always analyzable.

use super::error::{ValidationError, ValidationResult};
use super::types::{CycleRecord, SymptomObservation};
use serde::{Deserialize, Serialize};

/// Ordered cycles and observations for one user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawSnapshot")]
pub struct Snapshot {
    cycles: Vec<CycleRecord>,
    observations: Vec<SymptomObservation>,
}

/// Unvalidated wire shape of a snapshot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub cycles: Vec<CycleRecord>,
    #[serde(default)]
    pub observations: Vec<SymptomObservation>,
}

impl Snapshot {
    /// Validate and wrap records
    ///
    /// Cycles must be strictly ascending by `start_date` and observations
    /// ascending by `timestamp`. At most one cycle may be open.
    pub fn new(
        cycles: Vec<CycleRecord>,
        observations: Vec<SymptomObservation>,
    ) -> ValidationResult<Self> {
        validate_cycles(&cycles)?;
        validate_observations(&observations)?;

        tracing::debug!(
            cycles = cycles.len(),
            observations = observations.len(),
            "Validated record snapshot"
        );

        Ok(Self {
            cycles,
            observations,
        })
    }

    /// A snapshot with no records at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn cycles(&self) -> &[CycleRecord] {
        &self.cycles
    }

    pub fn observations(&self) -> &[SymptomObservation] {
        &self.observations
    }

    /// The ongoing cycle, if one is open
    pub fn open_cycle(&self) -> Option<&CycleRecord> {
        self.cycles.iter().find(|c| c.is_open())
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.observations.is_empty()
    }
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = ValidationError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        Snapshot::new(raw.cycles, raw.observations)
    }
}

fn validate_cycles(cycles: &[CycleRecord]) -> ValidationResult<()> {
    for cycle in cycles {
        cycle.validate()?;
    }

    for pair in cycles.windows(2) {
        if pair[1].start_date <= pair[0].start_date {
            return Err(ValidationError::CyclesOutOfOrder {
                id: pair[1].id.clone(),
                start_date: pair[1].start_date,
            });
        }
    }

    let open: Vec<String> = cycles
        .iter()
        .filter(|c| c.is_open())
        .map(|c| c.id.clone())
        .collect();
    if open.len() > 1 {
        return Err(ValidationError::MultipleOpenCycles(open));
    }

    Ok(())
}

fn validate_observations(observations: &[SymptomObservation]) -> ValidationResult<()> {
    for observation in observations {
        observation.validate()?;
    }

    for pair in observations.windows(2) {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(ValidationError::ObservationsOutOfOrder {
                id: pair[1].id.clone(),
            });
        }
    }

    Ok(())
}
