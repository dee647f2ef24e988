//! Rule evaluation and the non-destructive preview pass.
//!
//! # Algorithm Summary
//!
//! 1. Keep only active rules (enabled, with at least one action)
//! 2. Aggregate the input plan as the baseline
//! 3. Deep-copy the plan; for every session run each active rule in list
//!    order against the session's current state, folding the actions of
//!    every matching rule
//! 4. Track per-day minute deltas of touched sessions and the number of
//!    distinct touched sessions
//! 5. Aggregate the simulated plan and assemble [`PreviewMetrics`]

use serde::Serialize;

use crate::action::apply_action;
use crate::condition::evaluate_condition;
use crate::diff::content_differs;
use crate::metrics::{DayDelta, PreviewMetrics, aggregate};
use crate::parse::parse_minutes;
use crate::plan::{Session, WeeklyPlan};
use crate::rule::{Operator, Rule};

/// Whether `rule`'s conditions hold for `session` on `day`.
///
/// A rule without conditions matches everything regardless of its operator.
/// Does not look at `enabled` or the action list.
pub fn rule_matches(rule: &Rule, session: &Session, day: &str) -> bool {
    if rule.conditions.is_empty() {
        return true;
    }

    let mut results = rule
        .conditions
        .iter()
        .map(|condition| evaluate_condition(session, condition, day));

    match rule.operator {
        Operator::And => results.all(|matched| matched),
        Operator::Or => results.any(|matched| matched),
    }
}

/// Runs one rule against one session.
///
/// Returns `None` when the rule is disabled, has no actions, or does not
/// match. Otherwise folds every action over the session in order and returns
/// the result; the session counts as touched even if the result equals the
/// input.
pub fn apply_rule(rule: &Rule, session: &Session, day: &str) -> Option<Session> {
    if !rule.is_active() || !rule_matches(rule, session, day) {
        return None;
    }

    let mut updated = session.clone();
    for action in &rule.actions {
        updated = apply_action(&updated, action);
    }
    Some(updated)
}

/// Number of sessions an active rule matched during a preview pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHit {
    pub rule_id: String,
    pub rule_name: String,
    pub sessions_matched: usize,
}

/// A session touched by at least one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchedSession {
    pub day: String,
    pub session_id: String,
    /// Ids of the rules that matched, in application order.
    pub rules: Vec<String>,
    /// Whether the session's content actually differs after the pass.
    pub changed: bool,
}

/// Outcome of a preview pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    /// The plan after every active rule has run. Owned, never aliasing the input.
    pub simulated_plan: WeeklyPlan,
    pub metrics: PreviewMetrics,
    /// Number of active rules.
    pub affected_rule_count: usize,
    /// One entry per active rule, in rule order.
    pub rule_hits: Vec<RuleHit>,
    /// One entry per touched session, in plan order.
    pub touched: Vec<TouchedSession>,
}

/// Applies `rules` to a copy of `plan` and reports the impact.
///
/// `plan` is never modified. Calling this repeatedly with the same inputs
/// yields equal results.
pub fn preview(rules: &[Rule], plan: &WeeklyPlan) -> PreviewResult {
    let active: Vec<&Rule> = rules.iter().filter(|rule| rule.is_active()).collect();
    if active.len() < rules.len() {
        tracing::debug!(
            inactive = rules.len() - active.len(),
            "skipping disabled or action-less rules"
        );
    }

    let baseline = aggregate(plan);
    let mut simulated_plan = plan.clone();
    let mut hit_counts = vec![0_usize; active.len()];
    let mut touched = Vec::new();
    let mut per_day_delta = Vec::with_capacity(simulated_plan.len());

    for (day, day_plan) in simulated_plan.days_mut() {
        let mut day_delta = 0_i64;

        for session in &mut day_plan.sessions {
            let mut updated: Option<Session> = None;
            let mut matched_rules = Vec::new();

            for (index, rule) in active.iter().enumerate() {
                let current = updated.as_ref().unwrap_or(&*session);
                if let Some(next) = apply_rule(rule, current, day) {
                    hit_counts[index] += 1;
                    matched_rules.push(rule.id.clone());
                    updated = Some(next);
                }
            }

            let Some(updated) = updated else {
                continue;
            };

            let change =
                parse_minutes(&updated.duration).saturating_sub(parse_minutes(&session.duration));
            day_delta = day_delta.saturating_add(change);
            touched.push(TouchedSession {
                day: day.to_string(),
                session_id: session.id.clone(),
                rules: matched_rules,
                changed: content_differs(session, &updated),
            });
            *session = updated;
        }

        per_day_delta.push((day.to_string(), day_delta, day_plan.sessions.len()));
    }

    let after = aggregate(&simulated_plan);

    let rule_hits: Vec<RuleHit> = active
        .iter()
        .zip(hit_counts)
        .map(|(rule, sessions_matched)| RuleHit {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            sessions_matched,
        })
        .collect();

    for hit in &rule_hits {
        tracing::debug!(
            rule = %hit.rule_name,
            sessions = hit.sessions_matched,
            "rule evaluated"
        );
    }

    // Summed from the per-day deltas so the two agree even when minutes saturate.
    let total_duration_delta = per_day_delta
        .iter()
        .map(|(_, delta, _)| *delta)
        .fold(0_i64, i64::saturating_add);

    let metrics = PreviewMetrics {
        sessions_touched: touched.len(),
        total_duration_delta,
        per_day: per_day_delta
            .into_iter()
            .map(|(day, delta, session_count)| DayDelta {
                day,
                delta,
                session_count,
            })
            .collect(),
        intensity_before: baseline.intensity,
        intensity_after: after.intensity,
    };

    PreviewResult {
        simulated_plan,
        metrics,
        affected_rule_count: active.len(),
        rule_hits,
        touched,
    }
}
