//! History command: list the change log.

use std::fmt::Write;

use anyhow::Result;
use tp_core::HistoryEntry;
use tp_db::Database;

use super::report::format_delta;

/// Formats history entries, newest first.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    let mut output = String::new();

    if entries.is_empty() {
        writeln!(output, "No changes recorded yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'tp apply' or 'tp diff --record' to add one.").unwrap();
        return output;
    }

    writeln!(output, "{:<17}  {:>9}  Summary", "When (UTC)", "Duration").unwrap();
    writeln!(
        output,
        "─────────────────  ─────────  ──────────────────────────────"
    )
    .unwrap();
    for entry in entries {
        let when = entry.timestamp.format("%Y-%m-%d %H:%M").to_string();
        writeln!(
            output,
            "{when:<17}  {:>9}  {}",
            format_delta(entry.metrics.total_duration_delta),
            entry.summary
        )
        .unwrap();
    }

    output
}

/// Runs the history command.
pub fn run(db: &Database, limit: Option<usize>, json: bool) -> Result<()> {
    let entries = db.list_history(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_history(&entries));
    }

    Ok(())
}
