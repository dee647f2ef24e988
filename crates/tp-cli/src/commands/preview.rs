//! Preview command: run rules against a copy of a plan and report the impact.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use tp_core::{PreviewResult, Rule, WeeklyPlan, preview};

use super::report::{format_impact, heading};
use super::util::load_plan;

/// Formats a preview result for human-readable output.
pub fn format_preview(result: &PreviewResult) -> String {
    let mut output = format_impact("PREVIEW", &result.metrics);

    writeln!(output).unwrap();
    heading(&mut output, "RULES");
    if result.rule_hits.is_empty() {
        writeln!(output, "(no active rules)").unwrap();
    }
    for hit in &result.rule_hits {
        writeln!(
            output,
            "{:<28} {} session(s)",
            hit.rule_name, hit.sessions_matched
        )
        .unwrap();
    }

    let unchanged = result.touched.iter().filter(|t| !t.changed).count();
    if unchanged > 0 {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Note: {unchanged} matched session(s) were already up to date."
        )
        .unwrap();
    }

    output
}

/// Runs the preview pass over an already-loaded plan.
pub fn simulate(rules: &[Rule], plan: &WeeklyPlan) -> PreviewResult {
    let result = preview(rules, plan);
    tracing::debug!(
        active_rules = result.affected_rule_count,
        sessions_touched = result.metrics.sessions_touched,
        "preview complete"
    );
    result
}

/// Runs the preview command.
pub fn run(plan_path: &Path, rules: &[Rule], json: bool) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let result = simulate(rules, &plan);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_preview(&result));
    }

    Ok(())
}
