//! Audit entries describing a committed change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::PreviewResult;
use crate::metrics::PreviewMetrics;

/// Most recent entries kept in the change history.
pub const DEFAULT_HISTORY_LIMIT: usize = 15;

/// One immutable record in the change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Human-readable one-liner.
    pub summary: String,
    pub metrics: PreviewMetrics,
}

impl HistoryEntry {
    /// Creates an entry with a fresh id.
    pub fn new(summary: String, metrics: PreviewMetrics, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            summary,
            metrics,
        }
    }

    /// Entry for a committed rule preview.
    pub fn from_preview(result: &PreviewResult, timestamp: DateTime<Utc>) -> Self {
        Self::new(preview_summary(result), result.metrics.clone(), timestamp)
    }

    /// Entry for a committed manual edit.
    pub fn from_manual(metrics: PreviewMetrics, timestamp: DateTime<Utc>) -> Self {
        let summary = format!("Manual edit · {} session(s)", metrics.sessions_touched);
        Self::new(summary, metrics, timestamp)
    }
}

/// Summary line for a rule preview, e.g. "Applied 2 rule(s) · 5 session(s)".
pub fn preview_summary(result: &PreviewResult) -> String {
    format!(
        "Applied {} rule(s) · {} session(s)",
        result.affected_rule_count, result.metrics.sessions_touched
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::engine::preview;
    use crate::plan::{DayPlan, Session, WeeklyPlan};
    use crate::rule::{Action, ActionKind, Rule};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_preview_entry_summarizes_rules_and_sessions() {
        let plan: WeeklyPlan = [("Lunes", DayPlan::new(vec![Session::new("s1"), Session::new("s2")]))]
            .into_iter()
            .collect();
        let rule = Rule {
            actions: vec![Action::new(ActionKind::AppendTag, "deload")],
            ..Rule::new("r1", "Deload")
        };
        let result = preview(&[rule], &plan);

        let entry = HistoryEntry::from_preview(&result, at());
        assert_eq!(entry.summary, "Applied 1 rule(s) · 2 session(s)");
        assert_eq!(entry.metrics, result.metrics);
        assert_eq!(entry.timestamp, at());
    }

    #[test]
    fn test_manual_entry_summary() {
        let metrics = PreviewMetrics {
            sessions_touched: 3,
            ..PreviewMetrics::default()
        };
        let entry = HistoryEntry::from_manual(metrics, at());
        assert_eq!(entry.summary, "Manual edit · 3 session(s)");
    }

    #[test]
    fn test_entries_get_distinct_ids() {
        let a = HistoryEntry::from_manual(PreviewMetrics::default(), at());
        let b = HistoryEntry::from_manual(PreviewMetrics::default(), at());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let entry = HistoryEntry::from_manual(PreviewMetrics::default(), at());
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"timestamp\":\"2025-03-03T09:30:00Z\""));
        let parsed: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
