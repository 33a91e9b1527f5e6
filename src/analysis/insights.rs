//! Insight Generator
//!
//! Turns a computed report into short plain-language observations.
//! Rule-based: each section contributes a few sentences, or a single
//! "not enough data" line when its status is `insufficient_data`.

use crate::analysis::correlations::CorrelationResult;
use crate::analysis::forecast::ForecastResult;
use crate::analysis::patterns::PatternResult;
use crate::analysis::report::{AnalysisReport, AnalysisStatus};
use crate::analysis::trends::{TrendLabel, TrendResult};
use chrono::NaiveDate;

/// Average intensity at or above which a symptom/phase pair is called out
const HIGH_INTENSITY: f64 = 7.0;

/// Closed cycles below which predictions are flagged as tentative
const CONFIDENT_CYCLE_COUNT: usize = 3;

/// Generate insight sentences for a report
pub fn generate_insights(report: &AnalysisReport) -> Vec<String> {
    let today = report.generated_at.date_naive();
    let mut insights = Vec::new();

    correlation_insights(&mut insights, &report.correlation);
    trend_insights(&mut insights, &report.trends);
    pattern_insights(&mut insights, &report.patterns);
    forecast_insights(&mut insights, &report.forecast, today);

    if report.unclassified_observations > 0 {
        insights.push(format!(
            "{} of {} observations fall outside any recorded cycle and were left out of phase analysis.",
            report.unclassified_observations, report.total_observations
        ));
    }

    insights
}

fn correlation_insights(insights: &mut Vec<String>, correlation: &CorrelationResult) {
    if correlation.status == AnalysisStatus::InsufficientData {
        insights.push(
            "Not enough data to relate symptoms to cycle phases yet: log at least two cycles along with your symptoms."
                .to_string(),
        );
        return;
    }

    if let Some((phase, count)) = correlation.most_symptomatic_phase() {
        insights.push(format!(
            "The {} phase is when you log the most symptoms ({} entries).",
            phase.label(),
            count
        ));
    }

    for pair in correlation
        .correlations
        .iter()
        .filter(|c| c.avg_intensity >= HIGH_INTENSITY)
    {
        insights.push(format!(
            "{} averages a high intensity of {:.1}/10 during the {} phase.",
            capitalize(&pair.symptom_type.label()),
            pair.avg_intensity,
            pair.phase.label()
        ));
    }
}

fn trend_insights(insights: &mut Vec<String>, trends: &TrendResult) {
    if trends.status == AnalysisStatus::InsufficientData {
        insights.push(format!(
            "No symptoms logged in the last {} days, so no trends are available.",
            trends.window_days
        ));
        return;
    }

    for (symptom, trend) in &trends.trends {
        let direction = match trend.trend_label {
            TrendLabel::Increasing => "trending up",
            TrendLabel::Decreasing => "trending down",
            TrendLabel::Stable => "stable",
        };
        insights.push(format!(
            "{} is {} (average intensity {:.1}/10 over {} entries).",
            capitalize(&symptom.label()),
            direction,
            trend.avg_intensity,
            trend.count
        ));
    }
}

fn pattern_insights(insights: &mut Vec<String>, patterns: &PatternResult) {
    if patterns.patterns.is_empty() && patterns.combinations.is_empty() {
        if patterns.status == AnalysisStatus::Ok {
            insights.push("No recurring symptom patterns found so far.".to_string());
        }
        return;
    }

    for pattern in &patterns.patterns {
        insights.push(format!("Recurring pattern: {}.", pattern.description));
    }
    for combination in &patterns.combinations {
        insights.push(format!("Frequent combination: {}.", combination.description));
    }
}

fn forecast_insights(insights: &mut Vec<String>, forecast: &ForecastResult, today: NaiveDate) {
    if let Some(score) = forecast.regularity_score {
        let band = if score >= 80.0 {
            "Your cycles are very regular"
        } else if score >= 60.0 {
            "Your cycles are moderately regular"
        } else {
            "Your cycle lengths vary considerably"
        };
        insights.push(format!("{} (regularity score {:.0}/100).", band, score));
    }

    if let Some(average) = forecast.average_length_days {
        insights.push(format!("Average cycle length is {:.1} days.", average));
    }

    if let (Some(shortest), Some(longest)) = (forecast.shortest_cycle_days, forecast.longest_cycle_days) {
        if longest - shortest > 7 {
            insights.push(format!(
                "Cycle length ranged from {} to {} days.",
                shortest, longest
            ));
        }
    }

    match forecast.predicted_next_start {
        Some(predicted) => {
            let days_until = (predicted - today).num_days();
            if days_until > 0 {
                insights.push(format!(
                    "Next cycle expected in about {} days ({}).",
                    days_until, predicted
                ));
            } else {
                insights.push(format!(
                    "Next cycle was expected around {} and may start any day.",
                    predicted
                ));
            }
        }
        None => insights.push(
            "Not enough closed cycles to predict the next one: record start and end dates for a full cycle."
                .to_string(),
        ),
    }

    if forecast.closed_cycles < CONFIDENT_CYCLE_COUNT {
        insights.push(format!(
            "Predictions firm up after {} complete cycles; {} recorded so far.",
            CONFIDENT_CYCLE_COUNT, forecast.closed_cycles
        ));
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
