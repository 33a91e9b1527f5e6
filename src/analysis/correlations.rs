//! Correlation Analyzer
//!
//! Measures how strongly each symptom type is associated with each cycle
//! phase: for every (symptom, phase) pair, the share of that symptom's
//! phase-resolved occurrences that fell into the phase.

use crate::analysis::phase::{CyclePhase, PhaseAssignment, PhaseClassifier};
use crate::analysis::report::AnalysisStatus;
use crate::analysis::stats::round_to;
use crate::config::CorrelationConfig;
use crate::records::{CycleRecord, SymptomObservation, SymptomType};
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Association between one symptom type and one phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseCorrelation {
    pub symptom_type: SymptomType,
    pub phase: CyclePhase,
    /// Observations of this symptom in this phase
    pub occurrence_count: usize,
    /// Share of the symptom's phase-resolved observations (0-100, one decimal)
    pub percentage: f64,
    /// Mean intensity of those observations (one decimal)
    pub avg_intensity: f64,
}

/// Output of the correlation analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub status: AnalysisStatus,
    pub window_months: u32,
    /// Observations inside the window, including unclassified ones
    pub total_observations: usize,
    /// Observations inside the window with no resolvable phase
    pub unclassified_observations: usize,
    /// Cycles overlapping the window
    pub cycles_in_window: usize,
    pub correlations: Vec<PhaseCorrelation>,
    /// Phase-resolved observations per phase, all symptoms combined
    pub phase_distribution: BTreeMap<CyclePhase, usize>,
}

impl CorrelationResult {
    /// Phase with the most observations (ties go to the earlier phase)
    pub fn most_symptomatic_phase(&self) -> Option<(CyclePhase, usize)> {
        self.phase_distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(phase, count)| (*phase, *count))
    }
}

/// Computes symptom/phase association strength
#[derive(Debug, Clone, Default)]
pub struct CorrelationAnalyzer {
    classifier: PhaseClassifier,
    config: CorrelationConfig,
}

#[derive(Default)]
struct PairTally {
    count: usize,
    intensity_sum: u64,
}

impl CorrelationAnalyzer {
    pub fn new(classifier: PhaseClassifier, config: CorrelationConfig) -> Self {
        Self { classifier, config }
    }

    /// Correlate symptoms with phases over the last `window_months`
    ///
    /// Returns `insufficient_data` when fewer than `min_cycles` distinct
    /// cycles overlap the window or no observation falls inside it.
    pub fn correlate(
        &self,
        observations: &[SymptomObservation],
        cycles: &[CycleRecord],
        window_months: u32,
        now: DateTime<Utc>,
    ) -> CorrelationResult {
        let assignments = self.classifier.classify_all(observations, cycles, now);
        self.correlate_classified(observations, &assignments, cycles, window_months, now)
    }

    /// Same as [`correlate`](Self::correlate), reusing phase assignments
    /// already computed for every observation (in the same order)
    pub fn correlate_classified(
        &self,
        observations: &[SymptomObservation],
        assignments: &[PhaseAssignment],
        cycles: &[CycleRecord],
        window_months: u32,
        now: DateTime<Utc>,
    ) -> CorrelationResult {
        let cutoff = now
            .checked_sub_months(Months::new(window_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let in_window: Vec<(&SymptomObservation, &PhaseAssignment)> = observations
            .iter()
            .zip(assignments)
            .filter(|(o, _)| o.timestamp >= cutoff && o.timestamp <= now)
            .collect();

        let cycles_in_window = self.count_cycles_in_window(cycles, cutoff, now);

        let mut pairs: BTreeMap<(SymptomType, CyclePhase), PairTally> = BTreeMap::new();
        let mut per_symptom: BTreeMap<SymptomType, usize> = BTreeMap::new();
        let mut phase_distribution: BTreeMap<CyclePhase, usize> = BTreeMap::new();
        let mut unclassified = 0;

        for &(observation, assignment) in &in_window {
            let Some(phase) = assignment.phase() else {
                unclassified += 1;
                continue;
            };

            let tally = pairs.entry((observation.symptom_type, phase)).or_default();
            tally.count += 1;
            tally.intensity_sum += u64::from(observation.intensity);

            *per_symptom.entry(observation.symptom_type).or_insert(0) += 1;
            *phase_distribution.entry(phase).or_insert(0) += 1;
        }

        let mut correlations: Vec<PhaseCorrelation> = pairs
            .into_iter()
            .map(|((symptom_type, phase), tally)| {
                let symptom_total = per_symptom.get(&symptom_type).copied().unwrap_or(1);
                PhaseCorrelation {
                    symptom_type,
                    phase,
                    occurrence_count: tally.count,
                    percentage: round_to(
                        tally.count as f64 / symptom_total as f64 * 100.0,
                        1,
                    ),
                    avg_intensity: round_to(tally.intensity_sum as f64 / tally.count as f64, 1),
                }
            })
            .collect();

        correlations.sort_by(|a, b| {
            a.symptom_type
                .as_str()
                .cmp(b.symptom_type.as_str())
                .then_with(|| b.occurrence_count.cmp(&a.occurrence_count))
                .then_with(|| a.phase.as_str().cmp(b.phase.as_str()))
        });

        let status = if in_window.is_empty() || cycles_in_window < self.config.min_cycles {
            AnalysisStatus::InsufficientData
        } else {
            AnalysisStatus::Ok
        };

        tracing::debug!(
            window_months,
            observations = in_window.len(),
            unclassified,
            cycles_in_window,
            pairs = correlations.len(),
            status = %status,
            "Computed symptom/phase correlations"
        );

        CorrelationResult {
            status,
            window_months,
            total_observations: in_window.len(),
            unclassified_observations: unclassified,
            cycles_in_window,
            correlations,
            phase_distribution,
        }
    }

    /// Cycles whose span intersects `[cutoff, now]` by calendar day
    fn count_cycles_in_window(
        &self,
        cycles: &[CycleRecord],
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> usize {
        let first_day = cutoff.date_naive();
        let last_day = now.date_naive();

        (0..cycles.len())
            .filter(|&index| {
                let starts_in_time = cycles[index].start_date <= last_day;
                let ends_in_time = self
                    .classifier
                    .cycle_last_day(cycles, index, now)
                    .is_some_and(|end| end >= first_day);
                starts_in_time && ends_in_time
            })
            .count()
    }
}
