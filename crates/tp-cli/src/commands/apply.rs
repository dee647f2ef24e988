//! Apply command: commit a preview and record it in the history.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tp_core::{HistoryEntry, Rule};
use tp_db::Database;

use super::preview::{format_preview, simulate};
use super::util::{load_plan, write_plan};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyOutput<'a> {
    output: &'a Path,
    history: &'a HistoryEntry,
}

/// Runs the apply command.
///
/// The input plan is read but never rewritten unless `output` points at it.
pub fn run(
    db: &mut Database,
    plan_path: &Path,
    rules: &[Rule],
    output: &Path,
    history_limit: usize,
    json: bool,
) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let result = simulate(rules, &plan);

    // A written plan always has a history entry.
    let entry = HistoryEntry::from_preview(&result, Utc::now());
    db.append_history(&entry, history_limit)
        .context("failed to record history entry")?;

    write_plan(output, &result.simulated_plan).with_context(|| {
        format!(
            "history entry '{}' was recorded but the plan was not written",
            entry.summary
        )
    })?;
    tracing::info!(
        summary = %entry.summary,
        output = %output.display(),
        "applied rules"
    );

    if json {
        let out = ApplyOutput {
            output,
            history: &entry,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_preview(&result));
        println!();
        println!("{}", entry.summary);
        println!("Wrote {}", output.display());
    }

    Ok(())
}
