//! Combined analysis report handed to the presentation layer

use crate::analysis::correlations::CorrelationResult;
use crate::analysis::forecast::ForecastResult;
use crate::analysis::patterns::PatternResult;
use crate::analysis::summary::SymptomSummary;
use crate::analysis::trends::TrendResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether an analyzer had enough data to produce a result
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Ok,
    InsufficientData,
}

impl AnalysisStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, AnalysisStatus::Ok)
    }

    /// `Ok` only when every status is `Ok`
    pub fn merge(statuses: &[AnalysisStatus]) -> AnalysisStatus {
        if statuses.iter().all(AnalysisStatus::is_ok) {
            AnalysisStatus::Ok
        } else {
            AnalysisStatus::InsufficientData
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Ok => write!(f, "ok"),
            AnalysisStatus::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

/// Everything the engine computed for one snapshot
///
/// Each section carries its own status, so a report with a usable trend but
/// no forecast is still a complete, valid report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The explicit "now" the report was computed against
    pub generated_at: DateTime<Utc>,
    /// `ok` only when every section is `ok`
    pub status: AnalysisStatus,
    pub total_cycles: usize,
    /// Every observation in the snapshot
    pub total_observations: usize,
    /// Observations outside every known or assumed cycle span
    pub unclassified_observations: usize,
    pub correlation: CorrelationResult,
    pub trends: TrendResult,
    pub patterns: PatternResult,
    pub forecast: ForecastResult,
    pub summary: SymptomSummary,
    pub insights: Vec<String>,
}

impl AnalysisReport {
    /// Status of each section, labelled
    pub fn section_statuses(&self) -> [(&'static str, AnalysisStatus); 5] {
        [
            ("correlation", self.correlation.status),
            ("trends", self.trends.status),
            ("patterns", self.patterns.status),
            ("forecast", self.forecast.status),
            ("summary", self.summary.status),
        ]
    }
}
