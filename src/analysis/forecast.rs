//! Cycle Forecaster
//!
//! Summarises closed cycle lengths, scores how regular they are and predicts
//! the next onset. Open cycles never contribute lengths; they only move the
//! anchor date the prediction is counted from.

use crate::analysis::report::AnalysisStatus;
use crate::analysis::stats::{mean, round_to, sample_stddev};
use crate::config::ForecastConfig;
use crate::records::CycleRecord;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Output of the cycle forecaster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub status: AnalysisStatus,
    /// Cycles with both start and end dates
    pub closed_cycles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_length_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev_days: Option<f64>,
    /// 0-100, higher means more predictable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regularity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortest_cycle_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_cycle_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_next_start: Option<NaiveDate>,
}

/// Predicts the next cycle onset
#[derive(Debug, Clone, Default)]
pub struct CycleForecaster {
    config: ForecastConfig,
}

impl CycleForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Forecast from ascending cycles
    ///
    /// Needs two closed cycles for statistics. A single closed cycle still
    /// seeds a prediction using the fallback cycle length; with none there is
    /// no prediction at all.
    pub fn forecast(&self, cycles: &[CycleRecord]) -> ForecastResult {
        let lengths: Vec<i64> = cycles.iter().filter_map(|c| c.length_days()).collect();
        let last_known_start = cycles.iter().map(|c| c.start_date).max();

        let shortest_cycle_days = lengths.iter().min().copied();
        let longest_cycle_days = lengths.iter().max().copied();

        if lengths.len() < 2 {
            let predicted_next_start = match (lengths.len(), last_known_start) {
                (1, Some(start)) => Some(
                    start + Duration::days(i64::from(self.config.fallback_cycle_length_days)),
                ),
                _ => None,
            };

            tracing::debug!(
                closed_cycles = lengths.len(),
                predicted = ?predicted_next_start,
                "Not enough closed cycles for forecast statistics"
            );

            return ForecastResult {
                status: AnalysisStatus::InsufficientData,
                closed_cycles: lengths.len(),
                average_length_days: None,
                stddev_days: None,
                regularity_score: None,
                shortest_cycle_days,
                longest_cycle_days,
                predicted_next_start,
            };
        }

        let values: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();
        let average = mean(&values).unwrap_or(0.0);
        let stddev = sample_stddev(&values).unwrap_or(0.0);
        let regularity = self.regularity_score(average, stddev);

        let predicted_next_start =
            last_known_start.map(|start| start + Duration::days(average.round() as i64));

        tracing::debug!(
            closed_cycles = lengths.len(),
            average,
            stddev,
            regularity,
            predicted = ?predicted_next_start,
            "Computed cycle forecast"
        );

        ForecastResult {
            status: AnalysisStatus::Ok,
            closed_cycles: lengths.len(),
            average_length_days: Some(round_to(average, 1)),
            stddev_days: Some(round_to(stddev, 2)),
            regularity_score: Some(round_to(regularity, 1)),
            shortest_cycle_days,
            longest_cycle_days,
            predicted_next_start,
        }
    }

    /// `100 - (stddev / mean) * 100 * scale`, clamped to 0-100
    pub fn regularity_score(&self, average: f64, stddev: f64) -> f64 {
        if average <= 0.0 {
            return 0.0;
        }
        (100.0 - (stddev / average) * 100.0 * self.config.regularity_scale).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlowIntensity;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closed(id: &str, start: NaiveDate, length: i64) -> CycleRecord {
        CycleRecord::closed(
            id,
            start,
            start + Duration::days(length - 1),
            FlowIntensity::Medium,
        )
        .unwrap()
    }

    #[test]
    fn test_scenario_three_cycles_plus_open() {
        let cycles = vec![
            closed("c1", date(2024, 1, 1), 28),
            closed("c2", date(2024, 1, 29), 30),
            closed("c3", date(2024, 2, 28), 26),
            CycleRecord::open("c4", date(2024, 3, 26), FlowIntensity::Light),
        ];

        let result = CycleForecaster::default().forecast(&cycles);
        assert_eq!(result.status, AnalysisStatus::Ok);
        assert_eq!(result.closed_cycles, 3);
        assert_eq!(result.average_length_days, Some(28.0));
        assert_eq!(result.stddev_days, Some(2.0));
        assert_eq!(result.regularity_score, Some(85.7));
        assert_eq!(result.shortest_cycle_days, Some(26));
        assert_eq!(result.longest_cycle_days, Some(30));
        assert_eq!(result.predicted_next_start, Some(date(2024, 4, 23)));
    }

    #[test]
    fn test_zero_cycles() {
        let result = CycleForecaster::default().forecast(&[]);
        assert_eq!(result.status, AnalysisStatus::InsufficientData);
        assert_eq!(result.predicted_next_start, None);
        assert_eq!(result.average_length_days, None);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("predicted_next_start").is_none());
        assert_eq!(json["status"], "insufficient_data");
    }

    #[test]
    fn test_only_open_cycle_has_no_prediction() {
        let cycles = vec![CycleRecord::open("c1", date(2024, 3, 1), FlowIntensity::Medium)];
        let result = CycleForecaster::default().forecast(&cycles);
        assert_eq!(result.status, AnalysisStatus::InsufficientData);
        assert_eq!(result.closed_cycles, 0);
        assert_eq!(result.predicted_next_start, None);
    }

    #[test]
    fn test_single_closed_cycle_seeds_prediction() {
        let cycles = vec![
            closed("c1", date(2024, 1, 1), 31),
            CycleRecord::open("c2", date(2024, 2, 1), FlowIntensity::Medium),
        ];
        let result = CycleForecaster::default().forecast(&cycles);
        assert_eq!(result.status, AnalysisStatus::InsufficientData);
        assert_eq!(result.average_length_days, None);
        assert_eq!(result.regularity_score, None);
        // Fallback length, counted from the most recent (open) start
        assert_eq!(result.predicted_next_start, Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_perfectly_regular_scores_100() {
        let cycles = vec![
            closed("c1", date(2024, 1, 1), 29),
            closed("c2", date(2024, 1, 30), 29),
            closed("c3", date(2024, 2, 28), 29),
        ];
        let result = CycleForecaster::default().forecast(&cycles);
        assert_eq!(result.regularity_score, Some(100.0));
        assert_eq!(result.stddev_days, Some(0.0));
        assert_eq!(result.predicted_next_start, Some(date(2024, 3, 28)));
    }

    #[test]
    fn test_regularity_clamps_at_zero() {
        let forecaster = CycleForecaster::default();
        // Variation of half the mean or more scores 0
        assert_eq!(forecaster.regularity_score(30.0, 15.0), 0.0);
        assert_eq!(forecaster.regularity_score(30.0, 40.0), 0.0);
        assert_eq!(forecaster.regularity_score(30.0, 0.0), 100.0);
        assert!((forecaster.regularity_score(28.0, 2.0) - 85.714).abs() < 0.001);
    }

    #[test]
    fn test_idempotent() {
        let cycles = vec![
            closed("c1", date(2024, 1, 1), 27),
            closed("c2", date(2024, 1, 28), 33),
        ];
        let forecaster = CycleForecaster::default();
        assert_eq!(forecaster.forecast(&cycles), forecaster.forecast(&cycles));
    }
}
