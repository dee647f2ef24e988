//! Batch rule engine for weekly training plans.
//!
//! This crate contains the fundamental types and logic for:
//! - Rules: declarative conditions and actions over plan sessions
//! - Preview: applying an ordered rule list to a copy of a plan and
//!   reporting the impact
//! - Manual diffs: producing the same impact report from two plan snapshots
//!
//! Everything here is synchronous and pure. Inputs are only read; every
//! result is freshly allocated.

mod action;
mod condition;
pub mod diff;
mod engine;
pub mod history;
mod metrics;
mod parse;
pub mod plan;
pub mod rule;
pub mod template;

pub use action::{DURATION_FLOOR_MINUTES, apply_action, rest_marker};
pub use condition::evaluate_condition;
pub use diff::{SessionChange, content_differs, diff_manual};
pub use engine::{PreviewResult, RuleHit, TouchedSession, apply_rule, preview, rule_matches};
pub use history::HistoryEntry;
pub use metrics::{
    DayDelta, IntensityHistogram, MISSING_INTENSITY, PlanAggregate, PreviewMetrics, aggregate,
};
pub use parse::{parse_int, parse_minutes};
pub use plan::{DayPlan, Session, WeeklyPlan};
pub use rule::{
    Action, ActionKind, ActionMode, Comparator, Condition, ConditionKind, Operator, Rule,
    UnknownKind,
};
pub use template::RuleTemplate;
