//! Condition evaluation against a single session.

use crate::parse::{parse_int, parse_minutes};
use crate::plan::Session;
use crate::rule::{Comparator, Condition, ConditionKind};

/// Decides whether `condition` holds for `session` on day `day`.
///
/// Never fails: combinations with no defined meaning evaluate to `false`.
///
/// - `modality` / `intensity`: `equals` is exact, `contains` is a
///   case-insensitive substring test.
/// - `duration`: minutes from [`parse_minutes`] compared against the
///   condition's leading integer. `gte`/`lte` are ordered comparisons;
///   `equals`/`contains` both mean numeric equality. A value without a
///   leading number never matches.
/// - `tag`: `contains` matches when any tag, or the day key itself,
///   contains the value case-insensitively.
pub fn evaluate_condition(session: &Session, condition: &Condition, day: &str) -> bool {
    match condition.kind {
        ConditionKind::Modality => compare_text(&session.modality, condition),
        ConditionKind::Intensity => compare_text(&session.intensity, condition),
        ConditionKind::Duration => compare_minutes(&session.duration, condition),
        ConditionKind::Tag => match condition.comparator {
            Comparator::Contains => {
                let needle = condition.value.to_lowercase();
                session
                    .tags
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(day))
                    .any(|tag| tag.to_lowercase().contains(&needle))
            }
            _ => false,
        },
        ConditionKind::Unknown => false,
    }
}

fn compare_text(field: &str, condition: &Condition) -> bool {
    match condition.comparator {
        Comparator::Equals => field == condition.value,
        Comparator::Contains => field
            .to_lowercase()
            .contains(&condition.value.to_lowercase()),
        _ => false,
    }
}

fn compare_minutes(duration: &str, condition: &Condition) -> bool {
    let Some(target) = parse_int(&condition.value) else {
        return false;
    };
    let minutes = parse_minutes(duration);

    match condition.comparator {
        Comparator::Gte => minutes >= target,
        Comparator::Lte => minutes <= target,
        Comparator::Equals | Comparator::Contains => minutes == target,
        Comparator::Unknown => false,
    }
}
