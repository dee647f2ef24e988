//! Diff command: impact report for a manual edit between two plan files.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tp_core::{HistoryEntry, PreviewMetrics, diff_manual};
use tp_db::Database;

use super::report::format_impact;
use super::util::load_plan;

/// Where a recorded diff goes.
pub struct Recorder<'a> {
    pub db: &'a mut Database,
    pub limit: usize,
}

/// Computes the manual-edit metrics between two plan files.
pub fn compute(before: &Path, after: &Path) -> Result<PreviewMetrics> {
    let before = load_plan(before)?;
    let after = load_plan(after)?;
    Ok(diff_manual(&before, &after))
}

/// Runs the diff command, optionally recording the edit.
pub fn run(before: &Path, after: &Path, json: bool, recorder: Option<Recorder<'_>>) -> Result<()> {
    let metrics = compute(before, after)?;

    if let Some(Recorder { db, limit }) = recorder {
        let entry = HistoryEntry::from_manual(metrics.clone(), Utc::now());
        db.append_history(&entry, limit)
            .context("failed to record history entry")?;
        tracing::info!(summary = %entry.summary, "recorded manual edit");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print!("{}", format_impact("MANUAL EDIT", &metrics));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn test_diff_counts_modified_added_and_removed() {
        let temp = TempDir::new().unwrap();
        let before = temp.path().join("before.json");
        let after = temp.path().join("after.json");
        fs::write(
            &before,
            r#"{"Lunes":{"sessions":[
                {"id":"s1","duration":"30 min","intensity":"RPE 7"},
                {"id":"s2","duration":"15 min"}
            ]}}"#,
        )
        .unwrap();
        fs::write(
            &after,
            r#"{"Lunes":{"sessions":[
                {"id":"s1","duration":"40 min","intensity":"RPE 7"},
                {"id":"s3","duration":"10 min"}
            ]}}"#,
        )
        .unwrap();

        let metrics = compute(&before, &after).unwrap();
        assert_eq!(metrics.sessions_touched, 3);
        assert_eq!(metrics.total_duration_delta, 5);
        assert_eq!(metrics.per_day[0].session_count, 2);
    }

    #[test]
    fn test_recorded_diff_lands_in_history() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.json");
        fs::write(&plan, r#"{"Lunes":{"sessions":[{"id":"s1"}]}}"#).unwrap();

        let mut db = Database::open_in_memory().unwrap();
        run(
            &plan,
            &plan,
            true,
            Some(Recorder {
                db: &mut db,
                limit: 15,
            }),
        )
        .unwrap();

        let history = db.list_history(None).unwrap();
        assert_eq!(history[0].summary, "Manual edit · 0 session(s)");
        assert!(history[0].metrics.is_unchanged());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.json");
        let err = compute(&missing, &missing).unwrap_err();
        assert!(err.to_string().contains("failed to read plan"));
    }
}
