//! Identity-based session diffing and the manual-edit report.
//!
//! Sessions are matched by `id` only. Two instances with the same id are the
//! same session; whether it changed is decided by comparing its content
//! fields (duration, modality, intensity, notes and the joined tag string).

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::metrics::{DayDelta, PreviewMetrics, aggregate};
use crate::plan::{Session, WeeklyPlan};

/// How one session id differs between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionChange {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl SessionChange {
    /// Whether the change counts as a touch in the impact report.
    pub const fn is_touched(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Indexes sessions by id. The first occurrence of a duplicated id wins.
pub fn index_sessions(sessions: &[Session]) -> HashMap<&str, &Session> {
    let mut index = HashMap::with_capacity(sessions.len());
    for session in sessions {
        index.entry(session.id.as_str()).or_insert(session);
    }
    index
}

/// Whether two instances of a session carry different content.
///
/// Tags are compared as the joined, ordered string: reordering tags counts
/// as a change.
pub fn content_differs(before: &Session, after: &Session) -> bool {
    before.duration != after.duration
        || before.modality != after.modality
        || before.intensity != after.intensity
        || before.notes != after.notes
        || before.joined_tags() != after.joined_tags()
}

/// Classifies one id given its instance in each snapshot.
pub fn classify(before: Option<&Session>, after: Option<&Session>) -> SessionChange {
    match (before, after) {
        (Some(b), Some(a)) if content_differs(b, a) => SessionChange::Modified,
        (Some(_), Some(_)) | (None, None) => SessionChange::Unchanged,
        (None, Some(_)) => SessionChange::Added,
        (Some(_), None) => SessionChange::Removed,
    }
}

/// Compares two session lists by id.
///
/// Every id present in either list appears once, in order of first
/// appearance: ids from `before` first, then ids only in `after`.
pub fn diff_sessions(before: &[Session], after: &[Session]) -> Vec<(String, SessionChange)> {
    let before_index = index_sessions(before);
    let after_index = index_sessions(after);

    let mut seen = BTreeSet::new();
    before
        .iter()
        .chain(after)
        .filter(|session| seen.insert(session.id.as_str()))
        .map(|session| {
            let id = session.id.as_str();
            let change = classify(
                before_index.get(id).copied(),
                after_index.get(id).copied(),
            );
            (id.to_string(), change)
        })
        .collect()
}

/// Builds the impact report for a hand-edited plan.
///
/// Touches come from the per-day identity diff. Duration deltas come from
/// the per-day aggregate difference, independently of the touched set, so a
/// touched session need not change duration.
pub fn diff_manual(before: &WeeklyPlan, after: &WeeklyPlan) -> PreviewMetrics {
    let before_agg = aggregate(before);
    let after_agg = aggregate(after);

    let days: BTreeSet<&str> = before.day_keys().chain(after.day_keys()).collect();

    let mut sessions_touched = 0;
    let mut per_day = Vec::with_capacity(days.len());

    for day in days {
        let before_sessions = before.get(day).map_or(&[][..], |d| d.sessions.as_slice());
        let after_sessions = after.get(day).map_or(&[][..], |d| d.sessions.as_slice());

        sessions_touched += diff_sessions(before_sessions, after_sessions)
            .iter()
            .filter(|(_, change)| change.is_touched())
            .count();

        per_day.push(DayDelta {
            day: day.to_string(),
            delta: after_agg
                .day_duration(day)
                .saturating_sub(before_agg.day_duration(day)),
            session_count: after_sessions.len(),
        });
    }

    tracing::debug!(
        sessions_touched,
        days = per_day.len(),
        "computed manual edit diff"
    );

    let total_duration_delta = per_day
        .iter()
        .map(|day| day.delta)
        .fold(0_i64, i64::saturating_add);

    PreviewMetrics {
        sessions_touched,
        total_duration_delta,
        per_day,
        intensity_before: before_agg.intensity,
        intensity_after: after_agg.intensity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::DayPlan;

    fn session(id: &str, duration: &str) -> Session {
        Session {
            duration: duration.to_string(),
            modality: "Strength".to_string(),
            intensity: "RPE 7".to_string(),
            ..Session::new(id)
        }
    }

    fn plan(days: Vec<(&str, Vec<Session>)>) -> WeeklyPlan {
        days.into_iter()
            .map(|(day, sessions)| (day, DayPlan::new(sessions)))
            .collect()
    }

    #[test]
    fn test_notes_edit_is_touched_without_duration_change() {
        let before = plan(vec![("Lunes", vec![session("s1", "30 min")])]);
        let mut after = before.clone();
        after.get_mut("Lunes").unwrap().sessions[0].notes = "reviewed".to_string();

        let metrics = diff_manual(&before, &after);
        assert_eq!(metrics.sessions_touched, 1);
        assert_eq!(metrics.total_duration_delta, 0);
        assert_eq!(
            metrics.per_day,
            vec![DayDelta {
                day: "Lunes".to_string(),
                delta: 0,
                session_count: 1,
            }]
        );
    }

    #[test]
    fn test_identical_snapshots_touch_nothing() {
        let before = plan(vec![
            ("Lunes", vec![session("s1", "30 min"), session("s2", "15 min")]),
            ("Martes", vec![session("s3", "45 min")]),
        ]);
        let metrics = diff_manual(&before, &before.clone());
        assert!(metrics.is_unchanged());
        assert_eq!(metrics.intensity_before, metrics.intensity_after);
    }

    #[test]
    fn test_added_and_removed_sessions_are_touched() {
        let before = plan(vec![("Lunes", vec![session("s1", "30 min"), session("s2", "15 min")])]);
        let after = plan(vec![("Lunes", vec![session("s1", "30 min"), session("s3", "20 min")])]);

        let metrics = diff_manual(&before, &after);
        assert_eq!(metrics.sessions_touched, 2);
        assert_eq!(metrics.total_duration_delta, 5);
        assert_eq!(metrics.per_day[0].session_count, 2);
    }

    #[test]
    fn test_tag_reorder_counts_as_change() {
        let mut a = session("s1", "30 min");
        a.tags = vec!["x".to_string(), "y".to_string()];
        let mut b = a.clone();
        b.tags = vec!["y".to_string(), "x".to_string()];
        assert!(content_differs(&a, &b));
    }

    #[test]
    fn test_non_content_fields_are_ignored() {
        let a = session("s1", "30 min");
        let mut b = a.clone();
        b.time = "07:00".to_string();
        b.block = "Bloque B".to_string();
        assert!(!content_differs(&a, &b));
        assert_eq!(classify(Some(&a), Some(&b)), SessionChange::Unchanged);
    }

    #[test]
    fn test_days_only_in_one_snapshot_are_included() {
        let before = plan(vec![("Lunes", vec![session("s1", "30 min")])]);
        let after = plan(vec![("Martes", vec![session("s1", "30 min")])]);

        let metrics = diff_manual(&before, &after);
        // Moving across days removes from one and adds to the other.
        assert_eq!(metrics.sessions_touched, 2);
        assert_eq!(metrics.total_duration_delta, 0);
        let deltas: Vec<_> = metrics.per_day.iter().map(|d| (d.day.as_str(), d.delta)).collect();
        assert_eq!(deltas, [("Lunes", -30), ("Martes", 30)]);
    }

    #[test]
    fn test_diff_manual_with_huge_durations() {
        let before = plan(vec![(
            "Lunes",
            vec![session("s1", "9223372036854775807 min"), session("s2", "1 min")],
        )]);
        let metrics = diff_manual(&before, &before);
        assert!(metrics.is_unchanged());

        let after = plan(vec![
            ("Lunes", vec![session("s2", "1 min")]),
            ("Martes", vec![session("s1", "9223372036854775807 min")]),
        ]);
        let metrics = diff_manual(&before, &after);
        let deltas: Vec<_> = metrics.per_day.iter().map(|d| (d.day.as_str(), d.delta)).collect();
        assert_eq!(deltas, [("Lunes", 1 - i64::MAX), ("Martes", i64::MAX)]);
        assert_eq!(metrics.total_duration_delta, 1);
    }

    #[test]
    fn test_per_day_deltas_sum_to_total() {
        let before = plan(vec![
            ("Lunes", vec![session("s1", "30 min")]),
            ("Martes", vec![session("s2", "20 min")]),
        ]);
        let after = plan(vec![
            ("Lunes", vec![session("s1", "40 min")]),
            ("Miércoles", vec![session("s3", "25 min")]),
        ]);

        let metrics = diff_manual(&before, &after);
        let sum: i64 = metrics.per_day.iter().map(|d| d.delta).sum();
        assert_eq!(sum, metrics.total_duration_delta);
        assert_eq!(metrics.total_duration_delta, 15);
    }

    #[test]
    fn test_diff_sessions_orders_by_first_appearance() {
        let before = vec![session("a", "1"), session("b", "1")];
        let after = vec![session("c", "1"), session("a", "2")];
        let changes = diff_sessions(&before, &after);
        assert_eq!(
            changes,
            vec![
                ("a".to_string(), SessionChange::Modified),
                ("b".to_string(), SessionChange::Removed),
                ("c".to_string(), SessionChange::Added),
            ]
        );
    }
}
