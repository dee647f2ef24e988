//! Weekly plan data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scheduled training block within a day.
///
/// `id` is the only identity field; everything else is mutable content.
/// Fields the engine does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier, unique across the whole plan.
    pub id: String,

    #[serde(default)]
    pub time: String,

    /// Block label (e.g. "Bloque A").
    #[serde(default)]
    pub block: String,

    /// Free-text duration label, e.g. "20 min".
    #[serde(default)]
    pub duration: String,

    #[serde(default)]
    pub modality: String,

    /// Free-text intensity label, e.g. "RPE 7" or "Alta".
    #[serde(default)]
    pub intensity: String,

    #[serde(default)]
    pub notes: String,

    /// Ordered, duplicate-free tag list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Creates a session with the given id and empty content.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Tags joined in order, used for content comparison.
    pub fn joined_tags(&self) -> String {
        self.tags.join(",")
    }
}

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DayPlan {
    /// Sessions in display order.
    #[serde(default)]
    pub sessions: Vec<Session>,

    /// Day-level descriptive fields (focus, micro-cycle, ...), untouched by the engine.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DayPlan {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            extra: Map::new(),
        }
    }
}

/// A plan keyed by day label.
///
/// Days iterate in key order so every report built from a plan is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyPlan {
    days: BTreeMap<String, DayPlan>,
}

impl WeeklyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a day, returning the previous value.
    pub fn insert(&mut self, day: impl Into<String>, plan: DayPlan) -> Option<DayPlan> {
        self.days.insert(day.into(), plan)
    }

    pub fn get(&self, day: &str) -> Option<&DayPlan> {
        self.days.get(day)
    }

    pub fn get_mut(&mut self, day: &str) -> Option<&mut DayPlan> {
        self.days.get_mut(day)
    }

    /// Iterates `(day, plan)` pairs in key order.
    pub fn days(&self) -> impl Iterator<Item = (&str, &DayPlan)> {
        self.days.iter().map(|(day, plan)| (day.as_str(), plan))
    }

    /// Iterates `(day, plan)` pairs in key order with mutable day plans.
    pub fn days_mut(&mut self) -> impl Iterator<Item = (&str, &mut DayPlan)> {
        self.days.iter_mut().map(|(day, plan)| (day.as_str(), plan))
    }

    pub fn day_keys(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of sessions across every day.
    pub fn session_count(&self) -> usize {
        self.days.values().map(|day| day.sessions.len()).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, DayPlan)> for WeeklyPlan {
    fn from_iter<I: IntoIterator<Item = (K, DayPlan)>>(iter: I) -> Self {
        Self {
            days: iter
                .into_iter()
                .map(|(day, plan)| (day.into(), plan))
                .collect(),
        }
    }
}
