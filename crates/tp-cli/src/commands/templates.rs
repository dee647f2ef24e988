//! Templates command: list the built-in rule templates.

use std::fmt::Write;

use anyhow::Result;
use tp_core::RuleTemplate;
use tp_core::template::builtin_templates;

use super::report::describe_rule;

/// Formats one template with its rules.
pub fn format_template(template: &RuleTemplate) -> String {
    let mut output = String::new();

    writeln!(output, "{}  [{}]", template.name, template.id).unwrap();
    if !template.description.is_empty() {
        writeln!(output, "  {}", template.description).unwrap();
    }
    if !template.tags.is_empty() {
        writeln!(output, "  tags: {}", template.tags.join(", ")).unwrap();
    }
    for rule in &template.rules {
        let state = if rule.enabled { "on " } else { "off" };
        writeln!(output, "  {state}  {}: {}", rule.name, describe_rule(rule)).unwrap();
    }

    output
}

/// Formats a list of templates separated by blank lines.
pub fn format_templates(templates: &[RuleTemplate]) -> String {
    templates
        .iter()
        .map(format_template)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the templates command.
pub fn run(json: bool) -> Result<()> {
    let templates = builtin_templates();

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
    } else {
        print!("{}", format_templates(&templates));
    }

    Ok(())
}
