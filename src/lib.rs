//! # Cadence
//!
//! Personal health time-series analytics: relates logged symptoms to
//! menstrual cycle phases, tracks intensity trends, mines recurring patterns
//! and forecasts the next cycle.
//!
//! ## Modules
//!
//! - [`records`]: symptom and cycle records, validated into a [`Snapshot`]
//! - [`analysis`]: phase classifier, analyzers and the [`AnalyticsEngine`] facade
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use cadence::{AnalyticsEngine, Config, CycleRecord, FlowIntensity, Snapshot};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
//! let end = NaiveDate::from_ymd_opt(2024, 1, 28).ok_or("bad date")?;
//! let cycles = vec![CycleRecord::closed("c1", start, end, FlowIntensity::Medium)?];
//!
//! let snapshot = Snapshot::new(cycles, vec![])?;
//! let engine = AnalyticsEngine::new(Config::default());
//! let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single().ok_or("bad time")?;
//!
//! let report = engine.analyze(&snapshot, now);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod records;

pub use analysis::{
    AnalysisReport, AnalysisStatus, AnalyticsEngine, CorrelationAnalyzer, CorrelationResult,
    CycleForecaster, CyclePhase, ForecastResult, PatternMiner, PatternResult, PhaseAssignment,
    PhaseClassifier, SymptomSummary, TrendAnalyzer, TrendLabel, TrendResult,
};

pub use config::{Config, ConfigError, LoggingConfig};

pub use records::{
    CycleRecord, FlowIntensity, Snapshot, SymptomObservation, SymptomType, ValidationError,
    ValidationResult,
};
