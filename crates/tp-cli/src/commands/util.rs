//! Shared utilities for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tp_core::{
    Action, ActionKind, ActionMode, Comparator, Condition, ConditionKind, Operator, Rule,
    RuleTemplate, WeeklyPlan,
};

/// Reads a weekly plan from a JSON file.
pub fn load_plan(path: &Path) -> Result<WeeklyPlan> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse plan {}", path.display()))
}

/// Writes a plan as pretty-printed JSON.
pub fn write_plan(path: &Path, plan: &WeeklyPlan) -> Result<()> {
    let mut json = serde_json::to_string_pretty(plan)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("failed to write plan {}", path.display()))
}

/// Reads a rule list from a JSON file.
///
/// The file holds either a bare rule list or a whole template. The shape is
/// picked from the top-level value so parse errors name the offending field.
pub fn load_rules(path: &Path) -> Result<Vec<Rule>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse rules {}", path.display()))?;
    let rules = if value.is_array() {
        serde_json::from_value::<Vec<Rule>>(value)
            .with_context(|| format!("failed to parse rule list {}", path.display()))?
    } else {
        serde_json::from_value::<RuleTemplate>(value)
            .with_context(|| format!("failed to parse rule template {}", path.display()))?
            .rules
    };
    warn_unknown_kinds(&rules);
    Ok(rules)
}

/// Logs rules carrying kinds this build does not recognize.
///
/// Such conditions never match and such actions do nothing.
pub fn warn_unknown_kinds(rules: &[Rule]) {
    for rule in rules {
        let unknown_conditions = rule
            .conditions
            .iter()
            .filter(|c| c.kind == ConditionKind::Unknown || c.comparator == Comparator::Unknown)
            .count();
        let unknown_actions = rule
            .actions
            .iter()
            .filter(|a| a.kind == ActionKind::Unknown)
            .count();
        if unknown_conditions > 0 || unknown_actions > 0 {
            tracing::warn!(
                rule = %rule.name,
                unknown_conditions,
                unknown_actions,
                "rule has unrecognized condition or action kinds"
            );
        }
    }
}

/// Splits off the first whitespace-delimited word.
fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace)
        .map_or((s, ""), |(word, rest)| (word, rest.trim_start()))
}

/// Parses `"<type> <comparator> <value>"`, e.g. `"duration lte 20"`.
///
/// The value is the rest of the line and may contain spaces.
pub fn parse_condition(input: &str) -> Result<Condition> {
    let (kind, rest) = next_word(input);
    let (comparator, value) = next_word(rest);
    if comparator.is_empty() {
        bail!("invalid condition '{input}': expected '<type> <comparator> <value>'");
    }
    Ok(Condition::new(
        kind.parse()?,
        comparator.parse()?,
        value.trim_end(),
    ))
}

/// Parses `"<action> [<mode>] <value>"`, e.g. `"bump-duration increase 5"`.
///
/// A mode is only read for `bump-duration`; every other action takes the rest
/// of the line as its value.
pub fn parse_action(input: &str) -> Result<Action> {
    let (kind, rest) = next_word(input);
    if kind.is_empty() {
        bail!("invalid action '{input}': expected '<action> [<mode>] <value>'");
    }
    let kind: ActionKind = kind.parse()?;

    if kind == ActionKind::BumpDuration {
        let (word, value) = next_word(rest);
        if let Ok(mode) = word.parse::<ActionMode>() {
            return Ok(Action::new(kind, value.trim_end()).with_mode(mode));
        }
    }
    Ok(Action::new(kind, rest.trim_end()))
}

/// Builds a single rule from `--when`/`--then` flags.
pub fn inline_rule(when: &[String], then: &[String], any: bool) -> Result<Rule> {
    if then.is_empty() {
        bail!("an inline rule needs at least one --then action");
    }
    let conditions = when
        .iter()
        .map(|input| parse_condition(input))
        .collect::<Result<Vec<_>>>()?;
    let actions = then
        .iter()
        .map(|input| parse_action(input))
        .collect::<Result<Vec<_>>>()?;

    Ok(Rule {
        operator: if any { Operator::Or } else { Operator::And },
        conditions,
        actions,
        ..Rule::new("inline", "Inline rule")
    })
}
