//! Reusable rule bundles: built-in templates and user presets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rule::{
    Action, ActionKind, ActionMode, Comparator, Condition, ConditionKind, Operator, Rule,
};

/// Most recent presets kept in the library.
pub const DEFAULT_PRESET_LIMIT: usize = 12;

/// A named list of rules that can be loaded into an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub rules: Vec<Rule>,
}

impl RuleTemplate {
    /// Builds a user preset from the rules currently being edited.
    ///
    /// Rules are stored with fresh ids so later edits to `rules` cannot
    /// collide with the saved copy.
    pub fn preset(name: &str, description: &str, rules: &[Rule]) -> Self {
        let description = description.trim();
        Self {
            id: new_id(),
            name: name.trim().to_string(),
            description: if description.is_empty() {
                "Custom preset".to_string()
            } else {
                description.to_string()
            },
            tags: vec!["custom".to_string()],
            rules: rules.iter().map(clone_rule).collect(),
        }
    }

    /// Returns the template's rules with fresh ids, ready for editing.
    pub fn instantiate(&self) -> Vec<Rule> {
        self.rules.iter().map(clone_rule).collect()
    }

    /// Whether `key` names this template by id or case-insensitive name.
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.name.eq_ignore_ascii_case(key)
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Copies a rule, giving it and each of its conditions and actions a new id.
pub fn clone_rule(rule: &Rule) -> Rule {
    Rule {
        id: new_id(),
        conditions: rule
            .conditions
            .iter()
            .map(|condition| Condition {
                id: new_id(),
                ..condition.clone()
            })
            .collect(),
        actions: rule
            .actions
            .iter()
            .map(|action| Action {
                id: new_id(),
                ..action.clone()
            })
            .collect(),
        ..rule.clone()
    }
}

/// Copies a rule for side-by-side editing, marking the name as a copy.
pub fn duplicate_rule(rule: &Rule) -> Rule {
    Rule {
        name: format!("{} (copy)", rule.name),
        ..clone_rule(rule)
    }
}

fn condition(id: &str, kind: ConditionKind, comparator: Comparator, value: &str) -> Condition {
    Condition {
        id: id.to_string(),
        ..Condition::new(kind, comparator, value)
    }
}

fn action(id: &str, kind: ActionKind, mode: ActionMode, value: &str) -> Action {
    Action {
        id: id.to_string(),
        ..Action::new(kind, value).with_mode(mode)
    }
}

/// Templates shipped with the engine.
pub fn builtin_templates() -> Vec<RuleTemplate> {
    vec![
        RuleTemplate {
            id: "tpl-balance-intensity".to_string(),
            name: "Balancear intensidades".to_string(),
            description: "Uniforma la intensidad de fuerza y marca descansos estratégicos."
                .to_string(),
            tags: vec!["fuerza".to_string(), "recuperación".to_string()],
            rules: vec![
                Rule {
                    description: "Ajusta sesiones de fuerza a RPE 8 para homogeneizar la carga."
                        .to_string(),
                    conditions: vec![
                        condition("tpl-cnd-1", ConditionKind::Modality, Comparator::Equals, "Strength"),
                        condition("tpl-cnd-2", ConditionKind::Intensity, Comparator::Contains, "RPE"),
                    ],
                    actions: vec![action("tpl-act-1", ActionKind::SetIntensity, ActionMode::Set, "RPE 8")],
                    ..Rule::new("tpl-rule-1", "Fuerza → RPE 8")
                },
                Rule {
                    description: "Añade recordatorio de descanso en bloques exigentes.".to_string(),
                    enabled: false,
                    operator: Operator::Or,
                    conditions: vec![condition(
                        "tpl-cnd-3",
                        ConditionKind::Intensity,
                        Comparator::Contains,
                        "Alta",
                    )],
                    actions: vec![action("tpl-act-2", ActionKind::AddRest, ActionMode::Set, "3")],
                    ..Rule::new("tpl-rule-2", "Descanso en alta intensidad")
                },
            ],
        },
        RuleTemplate {
            id: "tpl-duration-harmony".to_string(),
            name: "Armonizar duración".to_string(),
            description: "Eleva metcons cortos y etiqueta bloques largos para seguimiento."
                .to_string(),
            tags: vec!["metcon".to_string(), "volumen".to_string()],
            rules: vec![
                Rule {
                    description: "Aumenta 5 min los metcons por debajo de 20 min.".to_string(),
                    conditions: vec![
                        condition("tpl-cnd-4", ConditionKind::Modality, Comparator::Equals, "MetCon"),
                        condition("tpl-cnd-5", ConditionKind::Duration, Comparator::Lte, "20"),
                    ],
                    actions: vec![action(
                        "tpl-act-3",
                        ActionKind::BumpDuration,
                        ActionMode::Increase,
                        "5",
                    )],
                    ..Rule::new("tpl-rule-3", "MetCon cortos")
                },
                Rule {
                    description: "Agrega tag identificador a bloques de +45 min.".to_string(),
                    enabled: false,
                    conditions: vec![condition(
                        "tpl-cnd-6",
                        ConditionKind::Duration,
                        Comparator::Gte,
                        "45",
                    )],
                    actions: vec![action(
                        "tpl-act-4",
                        ActionKind::AppendTag,
                        ActionMode::Set,
                        "long-form",
                    )],
                    ..Rule::new("tpl-rule-4", "Label sesiones largas")
                },
            ],
        },
    ]
}

/// Looks up a built-in template by id or name.
pub fn find_builtin(key: &str) -> Option<RuleTemplate> {
    builtin_templates()
        .into_iter()
        .find(|template| template.matches_key(key))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_instantiate_assigns_fresh_ids_and_keeps_content() {
        let template = find_builtin("tpl-duration-harmony").unwrap();
        let rules = template.instantiate();

        assert_eq!(rules.len(), template.rules.len());
        for (copy, original) in rules.iter().zip(&template.rules) {
            assert_ne!(copy.id, original.id);
            assert_eq!(copy.name, original.name);
            assert_eq!(copy.enabled, original.enabled);
            assert_eq!(copy.conditions.len(), original.conditions.len());
            for (c, o) in copy.conditions.iter().zip(&original.conditions) {
                assert_ne!(c.id, o.id);
                assert_eq!((c.kind, c.comparator, &c.value), (o.kind, o.comparator, &o.value));
            }
        }
    }

    #[test]
    fn test_cloned_ids_are_unique() {
        let rules = find_builtin("tpl-balance-intensity").unwrap().instantiate();
        let mut ids = HashSet::new();
        for rule in &rules {
            assert!(ids.insert(rule.id.clone()));
            for c in &rule.conditions {
                assert!(ids.insert(c.id.clone()));
            }
            for a in &rule.actions {
                assert!(ids.insert(a.id.clone()));
            }
        }
    }

    #[test]
    fn test_duplicate_marks_name() {
        let rule = Rule::new("r1", "MetCon cortos");
        let copy = duplicate_rule(&rule);
        assert_eq!(copy.name, "MetCon cortos (copy)");
        assert_ne!(copy.id, rule.id);
    }

    #[test]
    fn test_preset_defaults_description_and_tags() {
        let preset = RuleTemplate::preset("  Deload week ", "   ", &[Rule::new("r1", "x")]);
        assert_eq!(preset.name, "Deload week");
        assert_eq!(preset.description, "Custom preset");
        assert_eq!(preset.tags, ["custom"]);
        assert_ne!(preset.rules[0].id, "r1");
    }

    #[test]
    fn test_find_builtin_by_name_ignores_case() {
        assert!(find_builtin("armonizar duración").is_some());
        assert!(find_builtin("missing").is_none());
    }

    #[test]
    fn test_builtin_templates_roundtrip_through_json() {
        let templates = builtin_templates();
        let json = serde_json::to_string(&templates).unwrap();
        let parsed: Vec<RuleTemplate> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, templates);
    }
}
