//! Analytics Facade
//!
//! Runs every analyzer over one shared snapshot and assembles the combined
//! report. Absence of data is reported per section through its status; the
//! facade itself never fails on a valid snapshot.

use crate::analysis::correlations::{CorrelationAnalyzer, CorrelationResult};
use crate::analysis::forecast::{CycleForecaster, ForecastResult};
use crate::analysis::insights::generate_insights;
use crate::analysis::patterns::{PatternMiner, PatternResult};
use crate::analysis::phase::PhaseClassifier;
use crate::analysis::report::{AnalysisReport, AnalysisStatus};
use crate::analysis::summary::summarize;
use crate::analysis::trends::{TrendAnalyzer, TrendResult};
use crate::config::Config;
use crate::records::{
    CycleRecord, Snapshot, SymptomObservation, SymptomType, ValidationResult,
};
use chrono::{DateTime, Utc};

/// Orchestrates the analyzers
///
/// Holds configuration only, no per-user state, so one engine can serve any
/// number of concurrent callers.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    config: Config,
    classifier: PhaseClassifier,
    correlations: CorrelationAnalyzer,
    trends: TrendAnalyzer,
    patterns: PatternMiner,
    forecaster: CycleForecaster,
}

impl AnalyticsEngine {
    /// Create an engine from configuration
    pub fn new(config: Config) -> Self {
        let classifier = PhaseClassifier::new(config.phases.clone());

        Self {
            correlations: CorrelationAnalyzer::new(classifier.clone(), config.correlation.clone()),
            trends: TrendAnalyzer::new(config.trends.clone()),
            patterns: PatternMiner::new(classifier.clone(), config.patterns.clone()),
            forecaster: CycleForecaster::new(config.forecast.clone()),
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &PhaseClassifier {
        &self.classifier
    }

    /// Validate raw records, then analyze them
    ///
    /// Fails fast on malformed input; no partial report is produced.
    pub fn analyze_records(
        &self,
        cycles: Vec<CycleRecord>,
        observations: Vec<SymptomObservation>,
        now: DateTime<Utc>,
    ) -> ValidationResult<AnalysisReport> {
        let snapshot = Snapshot::new(cycles, observations)?;
        Ok(self.analyze(&snapshot, now))
    }

    /// Run every analyzer against the snapshot as of `now`
    pub fn analyze(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> AnalysisReport {
        let cycles = snapshot.cycles();
        let observations = snapshot.observations();

        // Classify once; correlation and pattern mining share the assignments
        let assignments = self.classifier.classify_all(observations, cycles, now);
        let unclassified_observations = assignments.iter().filter(|a| a.is_unknown()).count();

        let correlation = self.correlations.correlate_classified(
            observations,
            &assignments,
            cycles,
            self.config.correlation.window_months,
            now,
        );
        let trends = self.trend(snapshot, None, now);
        let patterns = self.patterns.mine_classified(
            observations,
            &assignments,
            self.config.patterns.min_occurrences,
        );
        let forecast = self.forecast(snapshot);
        let summary = summarize(observations, self.config.summary.window_days, now);

        let status = AnalysisStatus::merge(&[
            correlation.status,
            trends.status,
            patterns.status,
            forecast.status,
            summary.status,
        ]);

        let mut report = AnalysisReport {
            generated_at: now,
            status,
            total_cycles: cycles.len(),
            total_observations: observations.len(),
            unclassified_observations,
            correlation,
            trends,
            patterns,
            forecast,
            summary,
            insights: Vec::new(),
        };
        report.insights = generate_insights(&report);

        tracing::info!(
            cycles = report.total_cycles,
            observations = report.total_observations,
            unclassified = report.unclassified_observations,
            correlation = %report.correlation.status,
            trends = %report.trends.status,
            patterns = %report.patterns.status,
            forecast = %report.forecast.status,
            "Analysis complete"
        );

        report
    }

    /// Correlation over the configured window
    pub fn correlate(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> CorrelationResult {
        self.correlations.correlate(
            snapshot.observations(),
            snapshot.cycles(),
            self.config.correlation.window_months,
            now,
        )
    }

    /// Trends over the configured window, optionally for one symptom
    pub fn trend(
        &self,
        snapshot: &Snapshot,
        symptom_type: Option<SymptomType>,
        now: DateTime<Utc>,
    ) -> TrendResult {
        self.trends.trend(
            snapshot.observations(),
            symptom_type,
            self.config.trends.window_days,
            now,
        )
    }

    /// Recurring patterns with the configured minimum occurrences
    pub fn mine(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PatternResult {
        self.patterns.mine(
            snapshot.observations(),
            snapshot.cycles(),
            self.config.patterns.min_occurrences,
            now,
        )
    }

    pub fn forecast(&self, snapshot: &Snapshot) -> ForecastResult {
        self.forecaster.forecast(snapshot.cycles())
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
