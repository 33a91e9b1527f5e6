//! Core record types supplied by the record store
//!
//! - `SymptomObservation`: one logged symptom with an intensity
//! - `CycleRecord`: one menstrual cycle, open until its end date is set
//! - `SymptomType` and `FlowIntensity`: closed classification enums

use super::error::{ValidationError, ValidationResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lowest accepted symptom intensity
pub const MIN_INTENSITY: u8 = 1;
/// Highest accepted symptom intensity
pub const MAX_INTENSITY: u8 = 10;

/// Kind of symptom being logged
///
/// Deserialises through [`FromStr`], so unknown names surface as
/// [`ValidationError::UnknownSymptomType`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SymptomType {
    Acne,
    Hirsutism,
    HairLoss,
    WeightGain,
    MoodSwings,
    Fatigue,
    SleepIssues,
    IrregularPeriods,
    PelvicPain,
    Headaches,
    Cramps,
    Bloating,
    Anxiety,
    FoodCravings,
    BreastTenderness,
    Other,
}

impl SymptomType {
    /// Get all symptom types for iteration
    pub fn all() -> &'static [SymptomType] {
        &[
            SymptomType::Acne,
            SymptomType::Hirsutism,
            SymptomType::HairLoss,
            SymptomType::WeightGain,
            SymptomType::MoodSwings,
            SymptomType::Fatigue,
            SymptomType::SleepIssues,
            SymptomType::IrregularPeriods,
            SymptomType::PelvicPain,
            SymptomType::Headaches,
            SymptomType::Cramps,
            SymptomType::Bloating,
            SymptomType::Anxiety,
            SymptomType::FoodCravings,
            SymptomType::BreastTenderness,
            SymptomType::Other,
        ]
    }

    /// Stable snake_case name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            SymptomType::Acne => "acne",
            SymptomType::Hirsutism => "hirsutism",
            SymptomType::HairLoss => "hair_loss",
            SymptomType::WeightGain => "weight_gain",
            SymptomType::MoodSwings => "mood_swings",
            SymptomType::Fatigue => "fatigue",
            SymptomType::SleepIssues => "sleep_issues",
            SymptomType::IrregularPeriods => "irregular_periods",
            SymptomType::PelvicPain => "pelvic_pain",
            SymptomType::Headaches => "headaches",
            SymptomType::Cramps => "cramps",
            SymptomType::Bloating => "bloating",
            SymptomType::Anxiety => "anxiety",
            SymptomType::FoodCravings => "food_cravings",
            SymptomType::BreastTenderness => "breast_tenderness",
            SymptomType::Other => "other",
        }
    }

    /// Human-readable name for generated text ("hair loss")
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for SymptomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SymptomType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        SymptomType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownSymptomType(s.to_string()))
    }
}

impl TryFrom<String> for SymptomType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Menstrual flow intensity recorded with a cycle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FlowIntensity {
    Spotting,
    Light,
    #[default]
    Medium,
    Heavy,
    VeryHeavy,
}

impl FlowIntensity {
    pub fn all() -> &'static [FlowIntensity] {
        &[
            FlowIntensity::Spotting,
            FlowIntensity::Light,
            FlowIntensity::Medium,
            FlowIntensity::Heavy,
            FlowIntensity::VeryHeavy,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowIntensity::Spotting => "spotting",
            FlowIntensity::Light => "light",
            FlowIntensity::Medium => "medium",
            FlowIntensity::Heavy => "heavy",
            FlowIntensity::VeryHeavy => "very_heavy",
        }
    }
}

impl std::fmt::Display for FlowIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlowIntensity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        FlowIntensity::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownFlowIntensity(s.to_string()))
    }
}

impl TryFrom<String> for FlowIntensity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single logged symptom
///
/// Immutable once created. Intensity is on a 1 (mild) to 10 (severe) scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomObservation {
    /// Opaque identifier assigned by the record store
    pub id: String,
    pub symptom_type: SymptomType,
    /// Intensity, 1-10 inclusive
    pub intensity: u8,
    /// When the symptom was observed (UTC)
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SymptomObservation {
    /// Create a validated observation
    pub fn new(
        id: impl Into<String>,
        symptom_type: SymptomType,
        intensity: u8,
        timestamp: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        let observation = Self {
            id: id.into(),
            symptom_type,
            intensity,
            timestamp,
            notes: None,
        };
        observation.validate()?;
        Ok(observation)
    }

    /// Builder: attach free-text notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check the intensity invariant
    pub fn validate(&self) -> ValidationResult<()> {
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&self.intensity) {
            return Err(ValidationError::IntensityOutOfRange {
                id: self.id.clone(),
                intensity: self.intensity,
            });
        }
        Ok(())
    }
}

/// One menstrual cycle
///
/// Created with a start date only ("open"); the end date is set at most once
/// afterwards, which closes the cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleRecord {
    pub id: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub flow_intensity: FlowIntensity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CycleRecord {
    /// Create an open cycle
    pub fn open(id: impl Into<String>, start_date: NaiveDate, flow_intensity: FlowIntensity) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date: None,
            flow_intensity,
            notes: None,
        }
    }

    /// Create a closed cycle, validating the date order
    pub fn closed(
        id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        flow_intensity: FlowIntensity,
    ) -> ValidationResult<Self> {
        Self::open(id, start_date, flow_intensity).with_end_date(end_date)
    }

    /// Close this cycle
    pub fn with_end_date(mut self, end_date: NaiveDate) -> ValidationResult<Self> {
        self.end_date = Some(end_date);
        self.validate()?;
        Ok(self)
    }

    /// Builder: attach free-text notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True while no end date has been recorded
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Inclusive length in days, `None` for an open cycle
    pub fn length_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }

    /// Check the date-order invariant
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(ValidationError::EndBeforeStart {
                    id: self.id.clone(),
                    start_date: self.start_date,
                    end_date,
                });
            }
        }
        Ok(())
    }
}
