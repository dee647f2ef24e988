//! Plan-wide summary statistics and the shared impact report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parse::parse_minutes;
use crate::plan::WeeklyPlan;

/// Histogram bucket for sessions with no intensity label.
pub const MISSING_INTENSITY: &str = "Sin dato";

/// Count of sessions per intensity label.
pub type IntensityHistogram = BTreeMap<String, usize>;

/// Summary of one plan snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanAggregate {
    /// Sum of all session minutes.
    pub total_duration: i64,
    /// Sum of session minutes per day key.
    pub per_day_duration: BTreeMap<String, i64>,
    pub intensity: IntensityHistogram,
}

impl PlanAggregate {
    /// Minutes scheduled on `day`, 0 when the day is absent.
    pub fn day_duration(&self, day: &str) -> i64 {
        self.per_day_duration.get(day).copied().unwrap_or(0)
    }
}

/// Computes duration totals and the intensity histogram for `plan`.
pub fn aggregate(plan: &WeeklyPlan) -> PlanAggregate {
    let mut result = PlanAggregate::default();

    for (day, day_plan) in plan.days() {
        let minutes = day_plan
            .sessions
            .iter()
            .map(|session| parse_minutes(&session.duration))
            .fold(0_i64, i64::saturating_add);
        result.per_day_duration.insert(day.to_string(), minutes);
        result.total_duration = result.total_duration.saturating_add(minutes);

        for session in &day_plan.sessions {
            let label = if session.intensity.is_empty() {
                MISSING_INTENSITY
            } else {
                session.intensity.as_str()
            };
            *result.intensity.entry(label.to_string()).or_insert(0) += 1;
        }
    }

    result
}

/// Duration change and resulting session count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDelta {
    pub day: String,
    /// Signed minute delta.
    pub delta: i64,
    /// Sessions on the day after the change.
    pub session_count: usize,
}

/// Impact report shared by rule previews and manual edits.
///
/// Both producers fill this exact shape, so history and audit consumers do
/// not need to know which one ran.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewMetrics {
    pub sessions_touched: usize,
    /// Signed change in total plan minutes.
    pub total_duration_delta: i64,
    pub per_day: Vec<DayDelta>,
    pub intensity_before: IntensityHistogram,
    pub intensity_after: IntensityHistogram,
}

impl PreviewMetrics {
    /// Whether the report describes no change at all.
    pub fn is_unchanged(&self) -> bool {
        self.sessions_touched == 0
            && self.total_duration_delta == 0
            && self.per_day.iter().all(|day| day.delta == 0)
    }
}
