//! Analysis Module
//!
//! Pure, synchronous analyzers over a validated [`Snapshot`](crate::records::Snapshot),
//! plus the [`AnalyticsEngine`] facade that combines them into one report.

pub mod correlations;
pub mod engine;
pub mod forecast;
pub mod insights;
pub mod patterns;
pub mod phase;
pub mod report;
pub mod stats;
pub mod summary;
pub mod trends;

pub use correlations::{CorrelationAnalyzer, CorrelationResult, PhaseCorrelation};
pub use engine::AnalyticsEngine;
pub use forecast::{CycleForecaster, ForecastResult};
pub use insights::generate_insights;
pub use patterns::{PatternMiner, PatternResult, PhasePattern, SymptomCombination};
pub use phase::{CyclePhase, PhaseAssignment, PhaseBoundaries, PhaseClassifier};
pub use report::{AnalysisReport, AnalysisStatus};
pub use summary::{summarize, SymptomSummary};
pub use trends::{SymptomTrend, TrendAnalyzer, TrendLabel, TrendResult};
