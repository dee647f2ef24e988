//! Action application: one action, one session, one new session.

use crate::parse::{parse_int, parse_minutes};
use crate::plan::Session;
use crate::rule::{Action, ActionKind, ActionMode};

/// Lowest duration a `decrease` bump can produce.
pub const DURATION_FLOOR_MINUTES: i64 = 5;

/// Separator placed between existing notes and an appended marker.
pub const NOTE_SEPARATOR: &str = " · ";

/// Marker appended to notes by `add-rest`.
pub fn rest_marker(value: &str) -> String {
    format!("[Descanso extra: {value} min]")
}

/// Applies `action` to `session`, returning the updated copy.
///
/// The input is never modified. Unknown action kinds return an unchanged
/// copy.
pub fn apply_action(session: &Session, action: &Action) -> Session {
    let mut next = session.clone();

    match action.kind {
        ActionKind::SetIntensity => next.intensity.clone_from(&action.value),
        ActionKind::ChangeModality => next.modality.clone_from(&action.value),
        ActionKind::BumpDuration => {
            let minutes = bump_minutes(parse_minutes(&session.duration), action);
            next.duration = format!("{minutes} min");
        }
        ActionKind::AddRest => {
            let marker = rest_marker(&action.value);
            if !next.notes.contains(&marker) {
                if !next.notes.is_empty() {
                    next.notes.push_str(NOTE_SEPARATOR);
                }
                next.notes.push_str(&marker);
            }
        }
        ActionKind::AppendTag => {
            if !next.tags.contains(&action.value) {
                next.tags.push(action.value.clone());
            }
        }
        ActionKind::Unknown => {}
    }

    next
}

/// New minute count for a `bump-duration` action.
///
/// A missing or non-numeric value is a modifier of 0. An unset mode behaves
/// like `set`.
fn bump_minutes(current: i64, action: &Action) -> i64 {
    let modifier = parse_int(&action.value).unwrap_or(0);

    match action.mode {
        Some(ActionMode::Increase) => current.saturating_add(modifier),
        Some(ActionMode::Decrease) => current
            .saturating_sub(modifier)
            .max(DURATION_FLOOR_MINUTES),
        Some(ActionMode::Set | ActionMode::Unknown) | None => modifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            duration: "30 min".to_string(),
            modality: "Strength".to_string(),
            intensity: "RPE 7".to_string(),
            ..Session::new("s1")
        }
    }

    fn bump(mode: Option<ActionMode>, value: &str) -> Action {
        Action {
            mode,
            ..Action::new(ActionKind::BumpDuration, value)
        }
    }

    #[test]
    fn test_set_intensity_replaces_verbatim() {
        let out = apply_action(&session(), &Action::new(ActionKind::SetIntensity, "RPE 8"));
        assert_eq!(out.intensity, "RPE 8");
        assert_eq!(out.modality, "Strength");
    }

    #[test]
    fn test_change_modality_replaces_verbatim() {
        let out = apply_action(&session(), &Action::new(ActionKind::ChangeModality, "  Hybrid "));
        assert_eq!(out.modality, "  Hybrid ");
    }

    #[test]
    fn test_input_session_is_not_modified() {
        let original = session();
        let _ = apply_action(&original, &Action::new(ActionKind::SetIntensity, "Baja"));
        assert_eq!(original, session());
    }

    #[test]
    fn test_bump_increase_adds_modifier() {
        let out = apply_action(&session(), &bump(Some(ActionMode::Increase), "5"));
        assert_eq!(out.duration, "35 min");
    }

    #[test]
    fn test_bump_decrease_subtracts_modifier() {
        let out = apply_action(&session(), &bump(Some(ActionMode::Decrease), "10"));
        assert_eq!(out.duration, "20 min");
    }

    #[test]
    fn test_bump_decrease_never_goes_below_floor() {
        for start in ["0 min", "3 min", "6 min", "30 min", "none"] {
            for modifier in ["0", "1", "25", "30", "1000"] {
                let s = Session {
                    duration: start.to_string(),
                    ..Session::new("s")
                };
                let out = apply_action(&s, &bump(Some(ActionMode::Decrease), modifier));
                assert!(
                    parse_minutes(&out.duration) >= DURATION_FLOOR_MINUTES,
                    "{start} - {modifier} gave {}",
                    out.duration
                );
            }
        }
    }

    #[test]
    fn test_bump_decrease_raises_short_sessions_to_floor() {
        let s = Session {
            duration: "3 min".to_string(),
            ..Session::new("s")
        };
        let out = apply_action(&s, &bump(Some(ActionMode::Decrease), "0"));
        assert_eq!(out.duration, "5 min");
    }

    #[test]
    fn test_bump_set_and_unset_mode_use_modifier() {
        assert_eq!(apply_action(&session(), &bump(Some(ActionMode::Set), "45")).duration, "45 min");
        assert_eq!(apply_action(&session(), &bump(None, "12")).duration, "12 min");
    }

    #[test]
    fn test_bump_with_non_numeric_value_uses_zero() {
        assert_eq!(apply_action(&session(), &bump(Some(ActionMode::Increase), "abc")).duration, "30 min");
        assert_eq!(apply_action(&session(), &bump(Some(ActionMode::Set), "")).duration, "0 min");
    }

    #[test]
    fn test_bump_reserializes_label() {
        let s = Session {
            duration: "approx 40'".to_string(),
            ..Session::new("s")
        };
        assert_eq!(apply_action(&s, &bump(Some(ActionMode::Increase), "0")).duration, "40 min");
    }

    #[test]
    fn test_add_rest_appends_marker() {
        let out = apply_action(&session(), &Action::new(ActionKind::AddRest, "3"));
        assert_eq!(out.notes, "[Descanso extra: 3 min]");

        let with_notes = Session {
            notes: "Focus on form".to_string(),
            ..session()
        };
        let out = apply_action(&with_notes, &Action::new(ActionKind::AddRest, "3"));
        assert_eq!(out.notes, "Focus on form · [Descanso extra: 3 min]");
    }

    #[test]
    fn test_add_rest_is_idempotent() {
        let action = Action::new(ActionKind::AddRest, "3");
        let once = apply_action(&session(), &action);
        let twice = apply_action(&once, &action);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_rest_with_different_value_appends_again() {
        let once = apply_action(&session(), &Action::new(ActionKind::AddRest, "3"));
        let out = apply_action(&once, &Action::new(ActionKind::AddRest, "5"));
        assert_eq!(out.notes, "[Descanso extra: 3 min] · [Descanso extra: 5 min]");
    }

    #[test]
    fn test_append_tag_has_set_semantics() {
        let action = Action::new(ActionKind::AppendTag, "long-form");
        let once = apply_action(&session(), &action);
        let twice = apply_action(&once, &action);
        assert_eq!(once.tags, ["long-form"]);
        assert_eq!(twice.tags, ["long-form"]);
    }

    #[test]
    fn test_unknown_action_is_a_no_op() {
        let out = apply_action(&session(), &Action::new(ActionKind::Unknown, "x"));
        assert_eq!(out, session());
    }
}
