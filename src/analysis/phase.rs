//! Phase Classifier
//!
//! Maps a timestamp to a cycle-relative phase. A timestamp belongs to the
//! cycle whose start date is the latest one not after it; the cycle runs until
//! the next cycle starts. The most recent cycle has no successor, so its span
//! is its own recorded length when closed, or the assumed length when open
//! (stretched to "now" if the open cycle has already run longer).
//!
//! Phase boundaries are fractions of the cycle length:
//!
//! ```text
//! day 1 ─ menstrual ─┬─ early_follicular ─┬─ ovulatory ─┬─ luteal ─┬─ pre_menstrual ─ L
//!               0.18·L (≥3)           0.40·L        0.55·L    L-0.10·L
//! ```

use crate::config::PhaseConfig;
use crate::records::{CycleRecord, SymptomObservation};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Cycle-relative phase of an observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    EarlyFollicular,
    Ovulatory,
    Luteal,
    PreMenstrual,
}

impl CyclePhase {
    /// Phases in cycle order
    pub fn all() -> &'static [CyclePhase] {
        &[
            CyclePhase::Menstrual,
            CyclePhase::EarlyFollicular,
            CyclePhase::Ovulatory,
            CyclePhase::Luteal,
            CyclePhase::PreMenstrual,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::EarlyFollicular => "early_follicular",
            CyclePhase::Ovulatory => "ovulatory",
            CyclePhase::Luteal => "luteal",
            CyclePhase::PreMenstrual => "pre_menstrual",
        }
    }

    /// Name used in generated text
    pub fn label(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::EarlyFollicular => "early follicular",
            CyclePhase::Ovulatory => "ovulatory",
            CyclePhase::Luteal => "luteal",
            CyclePhase::PreMenstrual => "pre-menstrual",
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAssignment {
    Known {
        phase: CyclePhase,
        /// Index of the containing cycle in the cycle slice
        cycle_index: usize,
        /// 1-indexed day within the cycle
        day_in_cycle: u32,
        cycle_length: u32,
    },
    /// Before the first cycle or past every known/assumed span
    Unknown,
}

impl PhaseAssignment {
    pub fn phase(&self) -> Option<CyclePhase> {
        match self {
            PhaseAssignment::Known { phase, .. } => Some(*phase),
            PhaseAssignment::Unknown => None,
        }
    }

    pub fn cycle_index(&self) -> Option<usize> {
        match self {
            PhaseAssignment::Known { cycle_index, .. } => Some(*cycle_index),
            PhaseAssignment::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, PhaseAssignment::Unknown)
    }
}

/// Last day (inclusive, 1-indexed) of each phase for one cycle length
///
/// Each boundary is pushed past the previous one so every phase keeps at
/// least one day, then clamped to the cycle length. Cycles shorter than five
/// days therefore lose their later phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBoundaries {
    pub cycle_length: u32,
    pub menstrual_end: u32,
    pub early_follicular_end: u32,
    pub ovulatory_end: u32,
    pub luteal_end: u32,
}

impl PhaseBoundaries {
    /// Compute boundaries for a cycle of `cycle_length` days
    pub fn for_length(cycle_length: u32, config: &PhaseConfig) -> Self {
        let length = cycle_length.max(1);
        let days = |fraction: f64| (fraction * length as f64).round() as u32;

        let menstrual_end = days(config.menstrual_fraction)
            .max(config.min_menstrual_days)
            .max(1)
            .min(length);
        let early_follicular_end = days(config.early_follicular_fraction)
            .max(menstrual_end + 1)
            .min(length);
        let ovulatory_end = days(config.ovulatory_fraction)
            .max(early_follicular_end + 1)
            .min(length);
        let luteal_end = length
            .saturating_sub(days(config.pre_menstrual_fraction).max(1))
            .max(ovulatory_end + 1)
            .min(length);

        Self {
            cycle_length: length,
            menstrual_end,
            early_follicular_end,
            ovulatory_end,
            luteal_end,
        }
    }

    /// Phase of a 1-indexed day, `None` outside `1..=cycle_length`
    pub fn phase_for_day(&self, day: u32) -> Option<CyclePhase> {
        if day == 0 || day > self.cycle_length {
            return None;
        }

        Some(if day <= self.menstrual_end {
            CyclePhase::Menstrual
        } else if day <= self.early_follicular_end {
            CyclePhase::EarlyFollicular
        } else if day <= self.ovulatory_end {
            CyclePhase::Ovulatory
        } else if day <= self.luteal_end {
            CyclePhase::Luteal
        } else {
            CyclePhase::PreMenstrual
        })
    }
}

/// Assigns cycle phases to timestamps
#[derive(Debug, Clone, Default)]
pub struct PhaseClassifier {
    config: PhaseConfig,
}

impl PhaseClassifier {
    pub fn new(config: PhaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    pub fn boundaries(&self, cycle_length: u32) -> PhaseBoundaries {
        PhaseBoundaries::for_length(cycle_length, &self.config)
    }

    /// Number of days the cycle at `index` spans
    ///
    /// A cycle with a successor runs until the successor starts. The most
    /// recent cycle spans the assumed length whether or not it has an end
    /// date; an open one is also treated as ongoing up to today.
    pub fn cycle_span_days(
        &self,
        cycles: &[CycleRecord],
        index: usize,
        now: DateTime<Utc>,
    ) -> Option<u32> {
        let cycle = cycles.get(index)?;

        let span = match cycles.get(index + 1) {
            Some(next) => (next.start_date - cycle.start_date).num_days(),
            None => {
                let assumed = i64::from(self.config.assumed_cycle_length_days);
                if cycle.is_open() {
                    let elapsed = (now.date_naive() - cycle.start_date).num_days() + 1;
                    elapsed.max(assumed)
                } else {
                    assumed
                }
            }
        };

        u32::try_from(span).ok().filter(|&s| s > 0)
    }

    /// Last calendar day (inclusive) covered by the cycle at `index`
    pub fn cycle_last_day(
        &self,
        cycles: &[CycleRecord],
        index: usize,
        now: DateTime<Utc>,
    ) -> Option<NaiveDate> {
        let span = self.cycle_span_days(cycles, index, now)?;
        cycles
            .get(index)?
            .start_date
            .checked_add_days(chrono::Days::new(u64::from(span) - 1))
    }

    /// Classify a single timestamp against ascending cycles
    pub fn classify(
        &self,
        timestamp: DateTime<Utc>,
        cycles: &[CycleRecord],
        now: DateTime<Utc>,
    ) -> PhaseAssignment {
        let date = timestamp.date_naive();
        let started = cycles.partition_point(|c| c.start_date <= date);
        self.assign(date, cycles, started, now)
    }

    /// Classify every observation, in order
    ///
    /// Walks both ascending sequences with a cursor; falls back to a binary
    /// search if an observation goes back in time.
    pub fn classify_all(
        &self,
        observations: &[SymptomObservation],
        cycles: &[CycleRecord],
        now: DateTime<Utc>,
    ) -> Vec<PhaseAssignment> {
        let mut started = 0;
        let mut previous: Option<NaiveDate> = None;

        observations
            .iter()
            .map(|observation| {
                let date = observation.timestamp.date_naive();
                if previous.is_some_and(|p| date < p) {
                    started = cycles.partition_point(|c| c.start_date <= date);
                }
                while started < cycles.len() && cycles[started].start_date <= date {
                    started += 1;
                }
                previous = Some(date);
                self.assign(date, cycles, started, now)
            })
            .collect()
    }

    /// `started` is the number of cycles starting on or before `date`
    fn assign(
        &self,
        date: NaiveDate,
        cycles: &[CycleRecord],
        started: usize,
        now: DateTime<Utc>,
    ) -> PhaseAssignment {
        let Some(cycle_index) = started.checked_sub(1) else {
            return PhaseAssignment::Unknown;
        };
        let Some(cycle_length) = self.cycle_span_days(cycles, cycle_index, now) else {
            return PhaseAssignment::Unknown;
        };

        let day = (date - cycles[cycle_index].start_date).num_days() + 1;
        let Ok(day_in_cycle) = u32::try_from(day) else {
            return PhaseAssignment::Unknown;
        };

        match self.boundaries(cycle_length).phase_for_day(day_in_cycle) {
            Some(phase) => PhaseAssignment::Known {
                phase,
                cycle_index,
                day_in_cycle,
                cycle_length,
            },
            None => PhaseAssignment::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{FlowIntensity, SymptomType};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn cycles() -> Vec<CycleRecord> {
        vec![
            CycleRecord::closed("c1", date(2024, 1, 1), date(2024, 1, 28), FlowIntensity::Medium)
                .unwrap(),
            CycleRecord::closed("c2", date(2024, 1, 29), date(2024, 2, 27), FlowIntensity::Heavy)
                .unwrap(),
            CycleRecord::open("c3", date(2024, 2, 28), FlowIntensity::Light),
        ]
    }

    #[test]
    fn test_boundaries_28_days() {
        let b = PhaseBoundaries::for_length(28, &PhaseConfig::default());
        assert_eq!(
            (b.menstrual_end, b.early_follicular_end, b.ovulatory_end, b.luteal_end),
            (5, 11, 15, 25)
        );
        assert_eq!(b.phase_for_day(1), Some(CyclePhase::Menstrual));
        assert_eq!(b.phase_for_day(5), Some(CyclePhase::Menstrual));
        assert_eq!(b.phase_for_day(6), Some(CyclePhase::EarlyFollicular));
        assert_eq!(b.phase_for_day(12), Some(CyclePhase::Ovulatory));
        assert_eq!(b.phase_for_day(16), Some(CyclePhase::Luteal));
        assert_eq!(b.phase_for_day(25), Some(CyclePhase::Luteal));
        assert_eq!(b.phase_for_day(26), Some(CyclePhase::PreMenstrual));
        assert_eq!(b.phase_for_day(28), Some(CyclePhase::PreMenstrual));
        assert_eq!(b.phase_for_day(29), None);
        assert_eq!(b.phase_for_day(0), None);
    }

    #[test]
    fn test_boundaries_scale_with_length() {
        let config = PhaseConfig::default();

        let b = PhaseBoundaries::for_length(30, &config);
        assert_eq!(
            (b.menstrual_end, b.early_follicular_end, b.ovulatory_end, b.luteal_end),
            (5, 12, 17, 27)
        );

        let b = PhaseBoundaries::for_length(40, &config);
        assert_eq!(
            (b.menstrual_end, b.early_follicular_end, b.ovulatory_end, b.luteal_end),
            (7, 16, 22, 36)
        );
    }

    #[test]
    fn test_boundaries_keep_menstrual_minimum() {
        // 0.18 * 10 rounds to 2, below the 3-day minimum
        let b = PhaseBoundaries::for_length(10, &PhaseConfig::default());
        assert_eq!(b.menstrual_end, 3);
        assert_eq!(b.early_follicular_end, 4);
        assert_eq!(b.ovulatory_end, 6);
        assert_eq!(b.luteal_end, 9);
        assert_eq!(b.phase_for_day(10), Some(CyclePhase::PreMenstrual));
    }

    #[test]
    fn test_boundaries_degenerate_cycle() {
        let b = PhaseBoundaries::for_length(2, &PhaseConfig::default());
        assert_eq!(b.phase_for_day(1), Some(CyclePhase::Menstrual));
        assert_eq!(b.phase_for_day(2), Some(CyclePhase::Menstrual));
        assert_eq!(b.phase_for_day(3), None);
    }

    #[test]
    fn test_classify_before_first_cycle_is_unknown() {
        let classifier = PhaseClassifier::default();
        let now = at(2024, 3, 10);
        assert_eq!(
            classifier.classify(at(2023, 12, 31), &cycles(), now),
            PhaseAssignment::Unknown
        );
        assert_eq!(
            classifier.classify(at(2024, 1, 5), &[], now),
            PhaseAssignment::Unknown
        );
    }

    #[test]
    fn test_classify_uses_next_cycle_start() {
        let classifier = PhaseClassifier::default();
        let now = at(2024, 3, 10);

        // Cycle 2 runs 2024-01-29 .. 2024-02-27, 30 days
        let assignment = classifier.classify(at(2024, 2, 27), &cycles(), now);
        assert_eq!(
            assignment,
            PhaseAssignment::Known {
                phase: CyclePhase::PreMenstrual,
                cycle_index: 1,
                day_in_cycle: 30,
                cycle_length: 30,
            }
        );

        let assignment = classifier.classify(at(2024, 1, 1), &cycles(), now);
        assert_eq!(assignment.phase(), Some(CyclePhase::Menstrual));
        assert_eq!(assignment.cycle_index(), Some(0));
    }

    #[test]
    fn test_open_cycle_uses_assumed_length() {
        let classifier = PhaseClassifier::default();
        let now = at(2024, 3, 10);

        // Open cycle from 2024-02-28 spans 28 days: through 2024-03-26
        let inside = classifier.classify(at(2024, 3, 26), &cycles(), now);
        assert_eq!(inside.phase(), Some(CyclePhase::PreMenstrual));
        assert_eq!(
            classifier.classify(at(2024, 3, 27), &cycles(), now),
            PhaseAssignment::Unknown
        );
    }

    #[test]
    fn test_open_cycle_stretches_to_now() {
        let classifier = PhaseClassifier::default();
        let now = at(2024, 4, 1);

        // 34 days elapsed since 2024-02-28, so the span is provisional 34 days
        assert_eq!(classifier.cycle_span_days(&cycles(), 2, now), Some(34));
        let assignment = classifier.classify(at(2024, 3, 30), &cycles(), now);
        assert!(matches!(
            assignment,
            PhaseAssignment::Known { cycle_length: 34, day_in_cycle: 32, .. }
        ));
        assert_eq!(
            classifier.cycle_last_day(&cycles(), 2, now),
            Some(date(2024, 4, 1))
        );
    }

    #[test]
    fn test_closed_last_cycle_uses_assumed_length() {
        let classifier = PhaseClassifier::default();
        let cycles = vec![CycleRecord::closed(
            "c1",
            date(2024, 1, 1),
            date(2024, 1, 26),
            FlowIntensity::Medium,
        )
        .unwrap()];
        let now = at(2024, 6, 1);

        // Recorded length is 26 days, but boundaries follow the 28-day span
        assert_eq!(classifier.cycle_span_days(&cycles, 0, now), Some(28));
        assert_eq!(
            classifier.classify(at(2024, 1, 24), &cycles, now),
            PhaseAssignment::Known {
                phase: CyclePhase::Luteal,
                cycle_index: 0,
                day_in_cycle: 24,
                cycle_length: 28,
            }
        );
        assert_eq!(
            classifier.classify(at(2024, 1, 27), &cycles, now).phase(),
            Some(CyclePhase::PreMenstrual)
        );
        assert_eq!(
            classifier.classify(at(2024, 1, 28), &cycles, now).phase(),
            Some(CyclePhase::PreMenstrual)
        );
        assert!(classifier.classify(at(2024, 1, 29), &cycles, now).is_unknown());
    }

    #[test]
    fn test_closed_last_cycle_ignores_now() {
        let classifier = PhaseClassifier::default();
        let cycles = vec![CycleRecord::closed(
            "c1",
            date(2024, 1, 1),
            date(2024, 1, 30),
            FlowIntensity::Medium,
        )
        .unwrap()];

        // Unlike an open cycle, a closed one never stretches to today
        assert_eq!(
            classifier.cycle_span_days(&cycles, 0, at(2024, 6, 1)),
            Some(28)
        );
        assert_eq!(
            classifier.cycle_last_day(&cycles, 0, at(2024, 6, 1)),
            Some(date(2024, 1, 28))
        );
    }

    #[test]
    fn test_classify_all_matches_classify() {
        let classifier = PhaseClassifier::default();
        let now = at(2024, 3, 10);
        let cycles = cycles();

        let days = [(2023, 12, 20), (2024, 1, 3), (2024, 1, 27), (2024, 2, 15), (2024, 3, 9), (2024, 1, 2)];
        let observations: Vec<SymptomObservation> = days
            .iter()
            .enumerate()
            .map(|(i, &(y, m, d))| {
                SymptomObservation::new(format!("o{}", i), SymptomType::Cramps, 5, at(y, m, d))
                    .unwrap()
            })
            .collect();

        let batch = classifier.classify_all(&observations, &cycles, now);
        assert_eq!(batch.len(), observations.len());
        for (observation, assignment) in observations.iter().zip(&batch) {
            assert_eq!(
                *assignment,
                classifier.classify(observation.timestamp, &cycles, now)
            );
        }
        assert!(batch[0].is_unknown());
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(CyclePhase::PreMenstrual.as_str(), "pre_menstrual");
        assert_eq!(CyclePhase::PreMenstrual.label(), "pre-menstrual");
        assert_eq!(
            serde_json::to_string(&CyclePhase::EarlyFollicular).unwrap(),
            "\"early_follicular\""
        );
    }
}
