//! Trend Analyzer
//!
//! Detects whether each symptom's intensity is rising, falling or flat over a
//! trailing window. Observations are bucketed into consecutive fixed-width
//! windows (7 days by default); a least-squares line over the bucket means
//! gives the slope in intensity points per week.

use crate::analysis::report::AnalysisStatus;
use crate::analysis::stats::{least_squares_slope, mean, round_to};
use crate::config::TrendConfig;
use crate::records::{SymptomObservation, SymptomType};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Direction of an intensity trend
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendLabel::Increasing => write!(f, "increasing"),
            TrendLabel::Decreasing => write!(f, "decreasing"),
            TrendLabel::Stable => write!(f, "stable"),
        }
    }
}

/// Trend for one symptom type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomTrend {
    /// Mean intensity over every matching observation (one decimal)
    pub avg_intensity: f64,
    /// Raw number of matching observations
    pub count: usize,
    pub trend_label: TrendLabel,
    /// Intensity points per week, absent with fewer than two non-empty buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    /// Buckets holding at least one observation
    pub active_buckets: usize,
}

/// Output of the trend analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub status: AnalysisStatus,
    pub window_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_filter: Option<SymptomType>,
    pub total_entries: usize,
    pub trends: BTreeMap<SymptomType, SymptomTrend>,
}

/// Computes intensity trends per symptom type
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Trend of each symptom type over `(now - window_days, now]`
    ///
    /// With `symptom_type` set only that type is analyzed.
    pub fn trend(
        &self,
        observations: &[SymptomObservation],
        symptom_type: Option<SymptomType>,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> TrendResult {
        let window_start = now
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let bucket_days = i64::from(self.config.bucket_days.max(1));
        let bucket_secs = bucket_days * 86_400;
        let bucket_count = (i64::from(window_days) + bucket_days - 1) / bucket_days;

        // symptom -> bucket index -> intensities
        let mut grouped: BTreeMap<SymptomType, BTreeMap<i64, Vec<f64>>> = BTreeMap::new();
        let mut total_entries = 0;

        for observation in observations {
            if observation.timestamp <= window_start || observation.timestamp > now {
                continue;
            }
            if symptom_type.is_some_and(|wanted| wanted != observation.symptom_type) {
                continue;
            }

            let elapsed = (observation.timestamp - window_start).num_seconds();
            let bucket = (elapsed / bucket_secs).min(bucket_count - 1);

            grouped
                .entry(observation.symptom_type)
                .or_default()
                .entry(bucket)
                .or_default()
                .push(f64::from(observation.intensity));
            total_entries += 1;
        }

        let trends: BTreeMap<SymptomType, SymptomTrend> = grouped
            .into_iter()
            .map(|(symptom, buckets)| (symptom, self.symptom_trend(&buckets)))
            .collect();

        let status = if total_entries == 0 {
            AnalysisStatus::InsufficientData
        } else {
            AnalysisStatus::Ok
        };

        tracing::debug!(
            window_days,
            entries = total_entries,
            symptoms = trends.len(),
            status = %status,
            "Computed symptom trends"
        );

        TrendResult {
            status,
            window_days,
            symptom_filter: symptom_type,
            total_entries,
            trends,
        }
    }

    fn symptom_trend(&self, buckets: &BTreeMap<i64, Vec<f64>>) -> SymptomTrend {
        let all: Vec<f64> = buckets.values().flatten().copied().collect();

        let points: Vec<(f64, f64)> = buckets
            .iter()
            .filter_map(|(index, values)| mean(values).map(|m| (*index as f64, m)))
            .collect();

        // Slope is per bucket; normalise to per week
        let slope = least_squares_slope(&points)
            .map(|per_bucket| per_bucket * 7.0 / f64::from(self.config.bucket_days.max(1)));

        let trend_label = match slope {
            Some(s) if s > self.config.slope_threshold => TrendLabel::Increasing,
            Some(s) if s < -self.config.slope_threshold => TrendLabel::Decreasing,
            _ => TrendLabel::Stable,
        };

        SymptomTrend {
            avg_intensity: round_to(mean(&all).unwrap_or(0.0), 1),
            count: all.len(),
            trend_label,
            slope: slope.map(|s| round_to(s, 2)),
            active_buckets: points.len(),
        }
    }
}
