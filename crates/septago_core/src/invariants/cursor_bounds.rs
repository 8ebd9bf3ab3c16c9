//! Cursor invariant: the active bar exists and the index is inside it.

use super::Invariant;
use crate::geometry::Geometry;
use crate::state::GameState;

/// Invariant: `active` names an existing bar and `0 <= index < len`.
pub struct CursorInBoundsInvariant;

impl Invariant for CursorInBoundsInvariant {
    fn holds(state: &GameState, _geometry: &Geometry) -> bool {
        let active = state.active();
        state
            .letters(active.bar)
            .is_some_and(|letters| active.index < letters.len())
    }

    fn description() -> &'static str {
        "Cursor references an existing bar and an index inside it"
    }
}
