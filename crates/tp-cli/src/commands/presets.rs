//! Presets command: manage the saved rule library.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Result, bail};
use serde::Serialize;
use tp_core::template::duplicate_rule;
use tp_core::{Rule, RuleTemplate};
use tp_db::{Database, StoredPreset};

use super::templates::format_template;
use super::util::load_rules;

/// Preset data for JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetEntry<'a> {
    #[serde(flatten)]
    pub template: &'a RuleTemplate,
    pub saved_at: String,
}

impl<'a> From<&'a StoredPreset> for PresetEntry<'a> {
    fn from(preset: &'a StoredPreset) -> Self {
        Self {
            template: &preset.template,
            saved_at: preset.saved_at.to_rfc3339(),
        }
    }
}

/// Formats the preset library as a table.
pub fn format_presets(presets: &[StoredPreset]) -> String {
    let mut output = String::new();

    if presets.is_empty() {
        writeln!(output, "No saved presets.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'tp presets save --name <name> --rules <file>' to create one."
        )
        .unwrap();
        return output;
    }

    writeln!(output, "{:<24}  {:>5}  {:<16}  Description", "Name", "Rules", "Saved").unwrap();
    writeln!(
        output,
        "────────────────────────  ─────  ────────────────  ──────────────────────"
    )
    .unwrap();
    for preset in presets {
        let saved = preset.saved_at.format("%Y-%m-%d %H:%M").to_string();
        writeln!(
            output,
            "{:<24}  {:>5}  {saved:<16}  {}",
            preset.template.name,
            preset.template.rules.len(),
            preset.template.description
        )
        .unwrap();
    }

    output
}

/// Lists saved presets.
pub fn list(db: &Database, json: bool) -> Result<()> {
    let presets = db.list_presets()?;

    if json {
        let entries: Vec<PresetEntry<'_>> = presets.iter().map(PresetEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_presets(&presets));
    }

    Ok(())
}

/// Shows one preset.
pub fn show(db: &Database, name: &str, json: bool) -> Result<()> {
    let Some(preset) = db.find_preset(name)? else {
        bail!("no preset named '{name}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&PresetEntry::from(&preset))?);
    } else {
        print!("{}", format_template(&preset.template));
    }

    Ok(())
}

/// Saves the rules in `rules_path` as a new preset.
pub fn save(
    db: &mut Database,
    name: &str,
    description: &str,
    rules_path: &Path,
    limit: usize,
) -> Result<RuleTemplate> {
    if name.trim().is_empty() {
        bail!("preset name must not be empty");
    }
    let rules = load_rules(rules_path)?;
    let template = RuleTemplate::preset(name, description, &rules);
    db.save_preset(&template, limit)?;
    tracing::info!(preset = %template.name, rules = template.rules.len(), "saved preset");
    println!("Saved preset '{}' ({} rule(s))", template.name, template.rules.len());
    Ok(template)
}

/// Appends a copy of one rule to the preset that holds it.
///
/// The copy lands right after the original and gets fresh ids.
pub fn duplicate(db: &mut Database, name: &str, rule_key: &str, limit: usize) -> Result<Rule> {
    let Some(mut preset) = db.find_preset(name)? else {
        bail!("no preset named '{name}'");
    };
    let rules = &mut preset.template.rules;
    let Some(index) = rules
        .iter()
        .position(|rule| rule.id == rule_key || rule.name.eq_ignore_ascii_case(rule_key))
    else {
        bail!("preset '{name}' has no rule named '{rule_key}'");
    };

    let copy = duplicate_rule(&rules[index]);
    rules.insert(index + 1, copy.clone());
    db.save_preset(&preset.template, limit)?;
    tracing::info!(preset = %preset.template.name, rule = %copy.name, "duplicated rule");
    println!("Added '{}' to preset '{}'", copy.name, preset.template.name);
    Ok(copy)
}

/// Deletes a preset.
pub fn delete(db: &mut Database, name: &str) -> Result<()> {
    if !db.delete_preset(name)? {
        bail!("no preset named '{name}'");
    }
    println!("Deleted preset '{name}'");
    Ok(())
}

/// Loads the rules of a saved preset, ready for a preview.
pub fn load(db: &Database, name: &str) -> Result<Vec<Rule>> {
    let Some(preset) = db.find_preset(name)? else {
        bail!("no preset named '{name}'");
    };
    Ok(preset.template.instantiate())
}
