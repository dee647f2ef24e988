//! Human-readable rendering of impact reports.
//!
//! Shared by `tp preview`, `tp apply` and `tp diff`, which all produce the
//! same [`PreviewMetrics`] shape.

use std::collections::BTreeSet;
use std::fmt::Write;

use tp_core::{ActionKind, PreviewMetrics, Rule};

/// Formats a signed minute delta, e.g. `+5 min`, `-35 min`, `0 min`.
pub fn format_delta(minutes: i64) -> String {
    if minutes > 0 {
        format!("+{minutes} min")
    } else {
        format!("{minutes} min")
    }
}

/// Renders a section heading with an underline of the same width.
pub fn heading(output: &mut String, title: &str) {
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

/// Formats the impact report under `title`.
pub fn format_impact(title: &str, metrics: &PreviewMetrics) -> String {
    let mut output = String::new();

    heading(&mut output, title);
    writeln!(output, "Sessions touched:  {}", metrics.sessions_touched).unwrap();
    writeln!(
        output,
        "Total duration:    {}",
        format_delta(metrics.total_duration_delta)
    )
    .unwrap();

    if metrics.is_unchanged() {
        writeln!(output).unwrap();
        writeln!(output, "No changes.").unwrap();
        return output;
    }

    writeln!(output).unwrap();
    heading(&mut output, "BY DAY");
    for day in &metrics.per_day {
        writeln!(
            output,
            "{:<12} {:>9}  {} session(s)",
            day.day,
            format_delta(day.delta),
            day.session_count
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    heading(&mut output, "INTENSITY");
    let labels: BTreeSet<&String> = metrics
        .intensity_before
        .keys()
        .chain(metrics.intensity_after.keys())
        .collect();
    for label in labels {
        let before = metrics.intensity_before.get(label).copied().unwrap_or(0);
        let after = metrics.intensity_after.get(label).copied().unwrap_or(0);
        writeln!(output, "{label:<12} {before:>3} → {after}").unwrap();
    }

    output
}

/// One-line description of a rule's logic, e.g.
/// `modality equals MetCon AND duration lte 20 => bump-duration increase 5`.
///
/// Modes are only shown for `bump-duration`, the one action that reads them.
pub fn describe_rule(rule: &Rule) -> String {
    let when = if rule.conditions.is_empty() {
        "always".to_string()
    } else {
        rule.conditions
            .iter()
            .map(|c| format!("{} {} {}", c.kind, c.comparator, c.value))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", rule.operator))
    };
    let then = rule
        .actions
        .iter()
        .map(|a| match a.mode {
            Some(mode) if a.kind == ActionKind::BumpDuration => {
                format!("{} {mode} {}", a.kind, a.value)
            }
            _ => format!("{} {}", a.kind, a.value),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{when} => {then}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tp_core::{Action, ActionMode, Comparator, Condition, ConditionKind, DayDelta, Operator};

    #[test]
    fn test_format_delta_signs() {
        assert_eq!(format_delta(5), "+5 min");
        assert_eq!(format_delta(-35), "-35 min");
        assert_eq!(format_delta(0), "0 min");
    }

    #[test]
    fn test_unchanged_report() {
        let output = format_impact("DIFF", &PreviewMetrics::default());
        assert_snapshot!(output, @r"
        DIFF
        ────
        Sessions touched:  0
        Total duration:    0 min

        No changes.
        ");
    }

    #[test]
    fn test_report_with_days_and_intensity() {
        let metrics = PreviewMetrics {
            sessions_touched: 2,
            total_duration_delta: -10,
            per_day: vec![
                DayDelta {
                    day: "Lunes".to_string(),
                    delta: 5,
                    session_count: 2,
                },
                DayDelta {
                    day: "Martes".to_string(),
                    delta: -15,
                    session_count: 1,
                },
            ],
            intensity_before: [("Alta".to_string(), 2), ("RPE 7".to_string(), 1)]
                .into_iter()
                .collect(),
            intensity_after: [("Alta".to_string(), 1), ("RPE 8".to_string(), 1)]
                .into_iter()
                .collect(),
        };

        let output = format_impact("PREVIEW", &metrics);
        assert_snapshot!(output, @r"
        PREVIEW
        ───────
        Sessions touched:  2
        Total duration:    -10 min

        BY DAY
        ──────
        Lunes           +5 min  2 session(s)
        Martes         -15 min  1 session(s)

        INTENSITY
        ─────────
        Alta           2 → 1
        RPE 7          1 → 0
        RPE 8          0 → 1
        ");
    }

    #[test]
    fn test_describe_rule() {
        let rule = Rule {
            conditions: vec![
                Condition::new(ConditionKind::Modality, Comparator::Equals, "MetCon"),
                Condition::new(ConditionKind::Duration, Comparator::Lte, "20"),
            ],
            actions: vec![
                Action::new(ActionKind::BumpDuration, "5").with_mode(ActionMode::Increase),
                Action::new(ActionKind::AppendTag, "short"),
            ],
            ..Rule::new("r1", "MetCon cortos")
        };
        assert_eq!(
            describe_rule(&rule),
            "modality equals MetCon AND duration lte 20 => bump-duration increase 5, append-tag short"
        );

        let any = Rule {
            operator: Operator::Or,
            ..rule
        };
        assert!(describe_rule(&any).contains(" OR "));
    }

    #[test]
    fn test_describe_rule_without_conditions() {
        let rule = Rule {
            actions: vec![Action::new(ActionKind::SetIntensity, "RPE 8")],
            ..Rule::new("r1", "all")
        };
        assert_eq!(describe_rule(&rule), "always => set-intensity RPE 8");
    }
}
