//! Pattern Miner
//!
//! Finds symptoms that keep coming back in the same cycle phase across
//! several distinct cycles, and groups of symptoms that tend to be logged on
//! the same day.

use crate::analysis::phase::{CyclePhase, PhaseAssignment, PhaseClassifier};
use crate::analysis::report::AnalysisStatus;
use crate::config::PatternConfig;
use crate::records::{CycleRecord, SymptomObservation, SymptomType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A symptom recurring in one phase across cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhasePattern {
    pub symptom_type: SymptomType,
    pub phase: CyclePhase,
    pub occurrences: usize,
    pub distinct_cycles: usize,
    pub description: String,
}

/// Symptoms repeatedly logged together on the same day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomCombination {
    pub symptoms: Vec<SymptomType>,
    /// Days on which exactly this set of symptoms was logged
    pub occurrences: usize,
    pub description: String,
}

/// Output of the pattern miner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternResult {
    pub status: AnalysisStatus,
    pub min_occurrences: usize,
    pub classified_observations: usize,
    pub unclassified_observations: usize,
    pub patterns: Vec<PhasePattern>,
    pub combinations: Vec<SymptomCombination>,
}

/// Mines recurring (symptom, phase) pairs
#[derive(Debug, Clone, Default)]
pub struct PatternMiner {
    classifier: PhaseClassifier,
    config: PatternConfig,
}

impl PatternMiner {
    pub fn new(classifier: PhaseClassifier, config: PatternConfig) -> Self {
        Self { classifier, config }
    }

    /// Recurring phase patterns plus same-day combinations
    pub fn mine(
        &self,
        observations: &[SymptomObservation],
        cycles: &[CycleRecord],
        min_occurrences: usize,
        now: DateTime<Utc>,
    ) -> PatternResult {
        let assignments = self.classifier.classify_all(observations, cycles, now);
        self.mine_classified(observations, &assignments, min_occurrences)
    }

    /// Same as [`mine`](Self::mine), reusing phase assignments already
    /// computed for every observation (in the same order)
    pub fn mine_classified(
        &self,
        observations: &[SymptomObservation],
        assignments: &[PhaseAssignment],
        min_occurrences: usize,
    ) -> PatternResult {
        let mut groups: BTreeMap<(SymptomType, CyclePhase), (usize, BTreeSet<usize>)> =
            BTreeMap::new();
        let mut classified = 0;

        for (observation, assignment) in observations.iter().zip(assignments) {
            let (Some(phase), Some(cycle_index)) = (assignment.phase(), assignment.cycle_index())
            else {
                continue;
            };
            classified += 1;

            let (count, seen_cycles) = groups
                .entry((observation.symptom_type, phase))
                .or_default();
            *count += 1;
            seen_cycles.insert(cycle_index);
        }

        let mut patterns: Vec<PhasePattern> = groups
            .into_iter()
            .filter(|(_, (count, seen_cycles))| {
                seen_cycles.len() >= self.config.min_distinct_cycles && *count >= min_occurrences
            })
            .map(|((symptom_type, phase), (occurrences, seen_cycles))| PhasePattern {
                symptom_type,
                phase,
                occurrences,
                distinct_cycles: seen_cycles.len(),
                description: describe_pattern(symptom_type, phase, occurrences, seen_cycles.len()),
            })
            .collect();

        patterns.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.symptom_type.as_str().cmp(b.symptom_type.as_str()))
                .then_with(|| a.phase.as_str().cmp(b.phase.as_str()))
        });

        let combinations = self.combinations(observations, min_occurrences);

        let status = if classified == 0 && combinations.is_empty() {
            AnalysisStatus::InsufficientData
        } else {
            AnalysisStatus::Ok
        };

        tracing::debug!(
            classified,
            patterns = patterns.len(),
            combinations = combinations.len(),
            status = %status,
            "Mined recurring symptom patterns"
        );

        PatternResult {
            status,
            min_occurrences,
            classified_observations: classified,
            unclassified_observations: observations.len() - classified,
            patterns,
            combinations,
        }
    }

    /// Sets of two or more symptom types logged on the same UTC day, kept
    /// when the same set recurs on at least `min_occurrences` days
    pub fn combinations(
        &self,
        observations: &[SymptomObservation],
        min_occurrences: usize,
    ) -> Vec<SymptomCombination> {
        let mut by_day: BTreeMap<NaiveDate, BTreeSet<SymptomType>> = BTreeMap::new();
        for observation in observations {
            by_day
                .entry(observation.timestamp.date_naive())
                .or_default()
                .insert(observation.symptom_type);
        }

        let mut counts: BTreeMap<Vec<SymptomType>, usize> = BTreeMap::new();
        for symptoms in by_day.into_values().filter(|s| s.len() >= 2) {
            *counts.entry(symptoms.into_iter().collect()).or_insert(0) += 1;
        }

        let mut combinations: Vec<SymptomCombination> = counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(symptoms, occurrences)| {
                let names: Vec<String> = symptoms.iter().map(|s| s.label()).collect();
                SymptomCombination {
                    description: format!(
                        "{} logged together on {} days",
                        names.join(" + "),
                        occurrences
                    ),
                    symptoms,
                    occurrences,
                }
            })
            .collect();

        combinations.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.symptoms.cmp(&b.symptoms))
        });
        combinations
    }
}

fn describe_pattern(
    symptom: SymptomType,
    phase: CyclePhase,
    occurrences: usize,
    cycles: usize,
) -> String {
    format!(
        "{} recurring in the {} phase across {} cycles ({} occurrences)",
        symptom.label(),
        phase.label(),
        cycles,
        occurrences
    )
}
