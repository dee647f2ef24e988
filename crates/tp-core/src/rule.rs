//! Rule, condition and action records.
//!
//! These are authored by the caller and only ever read by the engine. The
//! string-valued kinds deserialize leniently: an unrecognized value becomes
//! the `Unknown` variant, which the engine treats as inert (conditions fail,
//! actions do nothing). Parsing through [`FromStr`] is strict instead and
//! reports [`UnknownKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for kind strings that name no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownKind {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a string-backed kind enum with `Display`/`FromStr` and a
/// catch-all `Unknown` variant for lenient deserialization.
macro_rules! kind_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
            /// Any value not listed above.
            #[serde(other, rename = "unknown")]
            Unknown,
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Unknown => "unknown",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownKind {
                        kind: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

kind_enum! {
    /// Session field a condition inspects.
    ConditionKind, "condition type" {
        Modality => "modality",
        Intensity => "intensity",
        /// Compared numerically through `parse_minutes`.
        Duration => "duration",
        /// Session tags plus the containing day key.
        Tag => "tag",
    }
}

kind_enum! {
    /// How a condition compares its value.
    Comparator, "comparator" {
        Equals => "equals",
        /// Case-insensitive substring test.
        Contains => "contains",
        Gte => "gte",
        Lte => "lte",
    }
}

kind_enum! {
    /// What an action does to a session.
    ActionKind, "action type" {
        SetIntensity => "set-intensity",
        BumpDuration => "bump-duration",
        AddRest => "add-rest",
        ChangeModality => "change-modality",
        AppendTag => "append-tag",
    }
}

kind_enum! {
    /// Arithmetic mode for `bump-duration`. Ignored by every other action.
    ActionMode, "action mode" {
        Set => "set",
        Increase => "increase",
        Decrease => "decrease",
    }
}

/// How a rule combines its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

impl FromStr for Operator {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" | "ALL" => Ok(Self::And),
            "OR" | "ANY" => Ok(Self::Or),
            _ => Err(UnknownKind {
                kind: "operator",
                value: s.to_string(),
            }),
        }
    }
}

/// A single test against a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ConditionKind,

    pub comparator: Comparator,

    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn new(kind: ConditionKind, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            comparator,
            value: value.into(),
        }
    }
}

/// A single mutation applied to a matching session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ActionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ActionMode>,

    #[serde(default)]
    pub value: String,
}

impl Action {
    pub fn new(kind: ActionKind, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            mode: None,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ActionMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

const fn enabled_by_default() -> bool {
    true
}

/// A named, toggleable bundle of conditions and actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    #[serde(default)]
    pub operator: Operator,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Rule {
    /// Creates an enabled AND rule with no conditions or actions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            enabled: true,
            operator: Operator::And,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Whether the rule can change anything in a preview pass.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.actions.is_empty()
    }
}
