//! Symptom Summary
//!
//! Headline statistics over a trailing window: how much was logged, which
//! symptom dominates and the overall mean intensity.

use crate::analysis::report::AnalysisStatus;
use crate::analysis::stats::round_to;
use crate::records::{SymptomObservation, SymptomType};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomSummary {
    pub status: AnalysisStatus,
    pub window_days: u32,
    pub total_entries: usize,
    /// Most frequently logged type; ties go to the alphabetically first name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_symptom: Option<SymptomType>,
    /// Mean intensity over the window (two decimals)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_intensity: Option<f64>,
    pub counts: BTreeMap<SymptomType, usize>,
}

/// Summarise observations in `[now - window_days, now]`
pub fn summarize(
    observations: &[SymptomObservation],
    window_days: u32,
    now: DateTime<Utc>,
) -> SymptomSummary {
    let window_start = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut counts: BTreeMap<SymptomType, usize> = BTreeMap::new();
    let mut intensity_sum: u64 = 0;
    let mut total_entries = 0;

    for observation in observations
        .iter()
        .filter(|o| o.timestamp >= window_start && o.timestamp <= now)
    {
        *counts.entry(observation.symptom_type).or_insert(0) += 1;
        intensity_sum += u64::from(observation.intensity);
        total_entries += 1;
    }

    let most_common_symptom = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.as_str().cmp(a.0.as_str())))
        .map(|(symptom, _)| *symptom);

    let average_intensity = (total_entries > 0)
        .then(|| round_to(intensity_sum as f64 / total_entries as f64, 2));

    SymptomSummary {
        status: if total_entries == 0 {
            AnalysisStatus::InsufficientData
        } else {
            AnalysisStatus::Ok
        },
        window_days,
        total_entries,
        most_common_symptom,
        average_intensity,
        counts,
    }
}
