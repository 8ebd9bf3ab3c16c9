//! The reducer: `(state, event, geometry) -> state`.
//!
//! Total over every event. Malformed payloads fall back to a safe default or
//! a no-op and are only visible through [`GameState::last_action`].

use crate::bar::{BarId, GridBarId, HiddenBarId, Scope};
use crate::event::{EventKind, EventPayload, GridEvent, IndexArg};
use crate::geometry::{BarPosition, Geometry};
#[cfg(debug_assertions)]
use crate::invariants::{InvariantSet, SeptagoInvariants};
use crate::state::{ActiveRef, GameState, LastAction, clamp_index, first_empty_index};
use tracing::{debug, instrument};

/// Applies one event and returns the next snapshot.
///
/// The input is never modified. After the type-specific transition, a
/// numeric `client_seq` greater than the current `last_client_seq` replaces
/// it, whatever the event type.
#[instrument(skip_all, fields(event = %event.kind, state_id = %state.state_id()))]
pub fn reduce(state: &GameState, event: &GridEvent, geometry: &Geometry) -> GameState {
    let mut next = state.clone();

    let action = match &event.kind {
        EventKind::InputLetter => on_input_letter(&mut next, &event.payload, geometry),
        EventKind::MoveNext => on_move(&mut next, 1),
        EventKind::MovePrev => on_move(&mut next, -1),
        EventKind::SetActiveBar => on_set_active(&mut next, &event.payload),
        EventKind::Backspace => on_backspace(&mut next, geometry),
        EventKind::Reset => {
            next.reset_in_place();
            LastAction::Reset
        }
        EventKind::Tick => LastAction::Tick,
        EventKind::Unrecognized(tag) => LastAction::Ignored(tag.clone()),
    };
    next.last_action = action;

    if let Some(seq) = event.payload.client_seq()
        && seq > next.last_client_seq
    {
        next.last_client_seq = seq;
    }

    debug!(
        action = %next.last_action,
        bar = %next.active.bar,
        index = next.active.index,
        client_seq = next.last_client_seq,
        "Reduced event"
    );

    #[cfg(debug_assertions)]
    if let Err(violations) = SeptagoInvariants::check_all(&next, geometry) {
        panic!("reducer broke invariants on {}: {violations:?}", event.kind);
    }

    next
}

fn on_input_letter(
    state: &mut GameState,
    payload: &EventPayload,
    geometry: &Geometry,
) -> LastAction {
    let text = payload.letter_text().to_uppercase();
    let mut chars = text.trim().chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii_uppercase() => ch,
        _ => return LastAction::InputIgnored,
    };

    let ActiveRef { bar, index } = state.active;
    match bar {
        BarId::Hidden(id) => {
            let Some(letters) = state.hidden_cells.get_mut(id) else {
                return LastAction::InputHiddenMissing;
            };
            let Some(slot) = letters.get_mut(index) else {
                return LastAction::InputOutOfBounds;
            };
            *slot = Some(letter);
        }
        BarId::Grid(id) => {
            if index >= state.grid_cells.bar(id).len() {
                return LastAction::InputOutOfBounds;
            }
            state
                .grid_cells
                .set_linked(geometry, BarPosition::new(id, index), Some(letter));
        }
    }

    step_cursor(state, 1);
    LastAction::Input(bar.scope())
}

/// Moves the cursor within its bar, clamped at both ends.
///
/// Returns `None` when the active bar is missing or empty.
fn step_cursor(state: &mut GameState, step: i64) -> Option<bool> {
    let len = state.letters(state.active.bar).map_or(0, <[_]>::len);
    if len == 0 {
        return None;
    }
    let current = state.active.index;
    let target = i64::try_from(current).map_or(current, |i| clamp_index(i + step, len));
    state.active.index = target;
    Some(target != current)
}

fn on_move(state: &mut GameState, step: i64) -> LastAction {
    match step_cursor(state, step) {
        None => LastAction::MoveEmpty,
        Some(false) => LastAction::MoveEdge,
        Some(true) => LastAction::Move,
    }
}

fn on_set_active(state: &mut GameState, payload: &EventPayload) -> LastAction {
    let scope = payload
        .scope_text()
        .and_then(|s| s.parse::<Scope>().ok())
        .unwrap_or_default();
    let requested = payload.bar_id_text().unwrap_or_default();

    let hidden = match scope {
        Scope::Hidden => requested
            .parse::<HiddenBarId>()
            .ok()
            .filter(|id| state.hidden_cells.get(*id).is_some())
            .or_else(|| state.hidden_cells.first_id()),
        Scope::Grid => None,
    };
    let bar: BarId = match hidden {
        Some(id) => id.into(),
        None if scope == Scope::Hidden => {
            debug!("No hidden bars; focusing the grid instead");
            GridBarId::H1.into()
        }
        None => requested.parse::<GridBarId>().unwrap_or(GridBarId::H1).into(),
    };

    let letters = state.letters(bar).unwrap_or_default();
    let index = match payload.index() {
        IndexArg::Omitted => first_empty_index(letters),
        IndexArg::Given(i) => clamp_index(i, letters.len()),
    };

    state.active = ActiveRef { bar, index };
    LastAction::SetActive
}

fn on_backspace(state: &mut GameState, geometry: &Geometry) -> LastAction {
    let ActiveRef { bar, index } = state.active;
    match bar {
        BarId::Hidden(id) => {
            let Some(letters) = state.hidden_cells.get_mut(id) else {
                return LastAction::BackspaceHiddenMissing;
            };
            if letters.is_empty() {
                return LastAction::BackspaceEmpty(Scope::Hidden);
            }
            let index = index.min(letters.len() - 1);
            if letters[index].is_some() {
                letters[index] = None;
                state.active.index = index;
                LastAction::BackspaceClear(Scope::Hidden)
            } else if index > 0 {
                letters[index - 1] = None;
                state.active.index = index - 1;
                LastAction::BackspacePrevClear(Scope::Hidden)
            } else {
                LastAction::BackspaceEdge(Scope::Hidden)
            }
        }
        BarId::Grid(id) => {
            let len = state.grid_cells.bar(id).len();
            if len == 0 {
                return LastAction::BackspaceEmpty(Scope::Grid);
            }
            let index = index.min(len - 1);
            let here = BarPosition::new(id, index);
            if state.grid_cells.get(here).is_some() {
                state.grid_cells.set_linked(geometry, here, None);
                state.active.index = index;
                LastAction::BackspaceClear(Scope::Grid)
            } else if index > 0 {
                state
                    .grid_cells
                    .set_linked(geometry, BarPosition::new(id, index - 1), None);
                state.active.index = index - 1;
                LastAction::BackspacePrevClear(Scope::Grid)
            } else {
                LastAction::BackspaceEdge(Scope::Grid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_puzzle, single_hidden_puzzle};

    fn fresh() -> GameState {
        GameState::init(&sample_puzzle(), Geometry::septago())
    }

    fn run(state: &GameState, events: &[GridEvent]) -> GameState {
        events
            .iter()
            .fold(state.clone(), |s, e| reduce(&s, e, Geometry::septago()))
    }

    fn hidden(n: usize) -> HiddenBarId {
        HiddenBarId::from_position(n).unwrap()
    }

    #[test]
    fn test_input_writes_and_advances() {
        let state = reduce(&fresh(), &GridEvent::input_letter(" p "), Geometry::septago());
        assert_eq!(state.grid_cells().bar(GridBarId::H1)[0], Some('P'));
        assert_eq!(state.active().index, 1);
        assert_eq!(state.last_action().to_string(), "input:grid");
    }

    #[test]
    fn test_input_rejects_non_letters() {
        let before = fresh();
        for junk in ["", "ab", "1", "é", " "] {
            let after = reduce(&before, &GridEvent::input_letter(junk), Geometry::septago());
            assert_eq!(after.grid_cells(), before.grid_cells(), "input {junk:?}");
            assert_eq!(after.active(), before.active());
            assert_eq!(after.last_action(), &LastAction::InputIgnored);
        }
    }

    #[test]
    fn test_input_at_end_stays_at_end() {
        let state = run(
            &fresh(),
            &[
                GridEvent::set_active_bar(Scope::Grid, GridBarId::V3, Some(6)),
                GridEvent::input_letter("L"),
            ],
        );
        assert_eq!(state.grid_cells().bar(GridBarId::V3)[6], Some('L'));
        assert_eq!(state.active(), ActiveRef::new(GridBarId::V3, 6));
    }

    #[test]
    fn test_input_propagates_to_partner() {
        let state = run(
            &fresh(),
            &[
                GridEvent::set_active_bar(Scope::Grid, GridBarId::V2, Some(3)),
                GridEvent::input_letter("i"),
            ],
        );
        assert_eq!(state.grid_cells().bar(GridBarId::V2)[3], Some('I'));
        assert_eq!(state.grid_cells().bar(GridBarId::H2)[3], Some('I'));
    }

    #[test]
    fn test_hidden_input_has_no_partner() {
        let state = run(
            &fresh(),
            &[
                GridEvent::set_active_bar(Scope::Hidden, hidden(1), Some(1)),
                GridEvent::input_letter("i"),
            ],
        );
        assert_eq!(state.hidden_cells().get(hidden(1)).unwrap()[1], Some('I'));
        assert_eq!(state.active().index, 2);
        assert_eq!(state.last_action().to_string(), "input:hidden");
        assert!(state.grid_cells().iter().all(|(_, l)| l.iter().all(Option::is_none)));
    }

    #[test]
    fn test_moves_clamp_at_edges() {
        let state = reduce(&fresh(), &GridEvent::move_prev(), Geometry::septago());
        assert_eq!(state.active().index, 0);
        assert_eq!(state.last_action(), &LastAction::MoveEdge);

        let state = run(&fresh(), &[GridEvent::move_next(), GridEvent::move_next()]);
        assert_eq!(state.active(), ActiveRef::new(GridBarId::H1, 2));
        assert_eq!(state.last_action(), &LastAction::Move);

        let state = run(
            &fresh(),
            &[
                GridEvent::set_active_bar(Scope::Hidden, hidden(0), Some(5)),
                GridEvent::move_next(),
            ],
        );
        assert_eq!(state.active(), ActiveRef::new(hidden(0), 5));
        assert_eq!(state.last_action().to_string(), "move:edge");
    }

    #[test]
    fn test_set_active_fallbacks() {
        let mut event = GridEvent::new(EventKind::SetActiveBar);
        event.payload.scope = Some("sideways".into());
        event.payload.bar_id = Some("v2".into());
        let state = reduce(&fresh(), &event, Geometry::septago());
        assert_eq!(state.active(), ActiveRef::new(GridBarId::V2, 0));
        assert_eq!(state.active().direction().to_string(), "vertical");

        event.payload.bar_id = Some("v9".into());
        let state = reduce(&fresh(), &event, Geometry::septago());
        assert_eq!(state.active().bar, BarId::Grid(GridBarId::H1));

        event.payload.scope = Some("hidden".into());
        event.payload.bar_id = Some("hidden7".into());
        let state = reduce(&fresh(), &event, Geometry::septago());
        assert_eq!(state.active().bar, BarId::Hidden(hidden(0)));

        for non_canonical in ["hidden02", "hidden+2", " hidden2", "Hidden2"] {
            event.payload.bar_id = Some(non_canonical.into());
            let state = reduce(&fresh(), &event, Geometry::septago());
            assert_eq!(state.active().bar, BarId::Hidden(hidden(0)), "bar id {non_canonical:?}");
        }

        let single = GameState::init(&single_hidden_puzzle(), Geometry::septago());
        event.payload.bar_id = Some("hidden2".into());
        let state = reduce(&single, &event, Geometry::septago());
        assert_eq!(state.active().bar, BarId::Hidden(hidden(0)));
    }

    #[test]
    fn test_set_active_index_handling() {
        let mut event = GridEvent::set_active_bar(Scope::Grid, GridBarId::H3, None);
        event.payload.index = Some(serde_json::json!(-3));
        let state = reduce(&fresh(), &event, Geometry::septago());
        assert_eq!(state.active().index, 0);

        event.payload.index = Some(serde_json::json!(40));
        let state = reduce(&fresh(), &event, Geometry::septago());
        assert_eq!(state.active().index, 6);

        event.payload.index = Some(serde_json::json!("x"));
        let state = reduce(&fresh(), &event, Geometry::septago());
        assert_eq!(state.active().index, 0);
    }

    #[test]
    fn test_set_active_lands_on_first_empty() {
        let state = run(
            &fresh(),
            &[
                GridEvent::input_letter("P"),
                GridEvent::input_letter("A"),
                GridEvent::set_active_bar(Scope::Grid, GridBarId::V1, None),
                GridEvent::set_active_bar(Scope::Grid, GridBarId::H1, None),
            ],
        );
        assert_eq!(state.active(), ActiveRef::new(GridBarId::H1, 2));
        // v1[1] was filled through the h1 intersection
        let state = reduce(
            &state,
            &GridEvent::set_active_bar(Scope::Grid, GridBarId::V1, None),
            Geometry::septago(),
        );
        assert_eq!(state.active().index, 0);
    }

    #[test]
    fn test_set_active_on_full_bar_lands_on_zero() {
        let mut events = vec![GridEvent::set_active_bar(Scope::Hidden, hidden(0), None)];
        events.extend("SILENT".chars().map(|c| GridEvent::input_letter(c.to_string())));
        events.push(GridEvent::set_active_bar(Scope::Hidden, hidden(0), None));
        let state = run(&fresh(), &events);
        assert_eq!(state.active(), ActiveRef::new(hidden(0), 0));
    }

    #[test]
    fn test_backspace_clears_partner() {
        let state = run(
            &fresh(),
            &[
                GridEvent::set_active_bar(Scope::Grid, GridBarId::H2, Some(5)),
                GridEvent::input_letter("E"),
                GridEvent::set_active_bar(Scope::Grid, GridBarId::V3, Some(3)),
                GridEvent::backspace(),
            ],
        );
        assert_eq!(state.grid_cells().bar(GridBarId::V3)[3], None);
        assert_eq!(state.grid_cells().bar(GridBarId::H2)[5], None);
        assert_eq!(state.active().index, 3);
        assert_eq!(state.last_action().to_string(), "bksp:grid_clear");
    }

    #[test]
    fn test_hidden_backspace_steps_back() {
        let state = run(
            &fresh(),
            &[
                GridEvent::set_active_bar(Scope::Hidden, hidden(0), Some(0)),
                GridEvent::input_letter("S"),
                GridEvent::backspace(),
            ],
        );
        assert_eq!(state.hidden_cells().get(hidden(0)).unwrap()[0], None);
        assert_eq!(state.active().index, 0);
        assert_eq!(state.last_action().to_string(), "bksp:hidden_prev_clear");

        let state = reduce(&state, &GridEvent::backspace(), Geometry::septago());
        assert_eq!(state.last_action().to_string(), "bksp:hidden_edge");
    }

    #[test]
    fn test_unrecognized_and_tick_change_nothing() {
        let before = run(&fresh(), &[GridEvent::input_letter("P")]);
        for event in [GridEvent::new("JUMP"), GridEvent::tick()] {
            let after = reduce(&before, &event, Geometry::septago());
            assert_eq!(after.grid_cells(), before.grid_cells());
            assert_eq!(after.hidden_cells(), before.hidden_cells());
            assert_eq!(after.active(), before.active());
        }
        let after = reduce(&before, &GridEvent::new("JUMP"), Geometry::septago());
        assert_eq!(after.last_action().to_string(), "ignored:JUMP");
    }

    #[test]
    fn test_client_seq_bookkeeping() {
        let state = reduce(&fresh(), &GridEvent::tick().with_client_seq(5), Geometry::septago());
        assert_eq!(state.last_client_seq(), 5);
        let state = reduce(&state, &GridEvent::new("X").with_client_seq(3), Geometry::septago());
        assert_eq!(state.last_client_seq(), 5);
        let state = reduce(&state, &GridEvent::move_next().with_client_seq(8), Geometry::septago());
        assert_eq!(state.last_client_seq(), 8);
    }

    #[test]
    fn test_reset_applies_seq_after_clearing() {
        let state = run(
            &fresh(),
            &[GridEvent::input_letter("P").with_client_seq(10)],
        );
        let reset = reduce(&state, &GridEvent::reset(), Geometry::septago());
        assert_eq!(reset.last_client_seq(), 0);
        let reset = reduce(&state, &GridEvent::reset().with_client_seq(11), Geometry::septago());
        assert_eq!(reset.last_client_seq(), 11);
        assert_ne!(reset.state_id(), state.state_id());
        assert_eq!(reset.active(), ActiveRef::home());
        assert_eq!(reset.puzzle_id(), state.puzzle_id());
        assert_eq!(reset.clue_order(), state.clue_order());
        assert!(reset.grid_cells().iter().all(|(_, l)| l.iter().all(Option::is_none)));
    }

    #[test]
    fn test_input_never_mutates_previous_snapshot() {
        let before = fresh();
        let copy = before.clone();
        let _ = reduce(&before, &GridEvent::input_letter("P"), Geometry::septago());
        assert_eq!(before, copy);
    }
}
