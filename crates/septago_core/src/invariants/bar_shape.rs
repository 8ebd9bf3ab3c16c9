//! Shape invariant: letter arrays keep the lengths fixed at init.

use super::Invariant;
use crate::bar::BarId;
use crate::geometry::Geometry;
use crate::state::GameState;

/// Invariant: every grid bar matches the geometry's length, and every
/// hidden bar matches its `clue_order` entry.
pub struct BarShapeInvariant;

impl Invariant for BarShapeInvariant {
    fn holds(state: &GameState, geometry: &Geometry) -> bool {
        let grid_ok = state
            .grid_cells()
            .iter()
            .all(|(bar, letters)| letters.len() == geometry.bar_len(bar) && !letters.is_empty());

        let hidden_ok = state.clue_order().iter().all(|clue| match clue.bar_id {
            BarId::Grid(bar) => clue.length == geometry.bar_len(bar),
            BarId::Hidden(id) => state
                .hidden_cells()
                .get(id)
                .is_some_and(|letters| letters.len() == clue.length),
        });

        let letters_ok = state
            .grid_cells()
            .iter()
            .flat_map(|(_, letters)| letters.iter())
            .chain(state.hidden_cells().iter().flat_map(|bar| bar.letters.iter()))
            .flatten()
            .all(char::is_ascii_uppercase);

        grid_ok && hidden_ok && letters_ok
    }

    fn description() -> &'static str {
        "Bars keep their lengths and hold only A-Z letters"
    }
}
