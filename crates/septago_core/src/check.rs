//! Answer checking.
//!
//! Produces [`Marks`] that the projector passes through untouched. Marks
//! describe a moment in time; callers drop them when letters change.

use crate::bar::{BarId, GridBarId};
use crate::geometry::{Geometry, cell_id};
use crate::puzzle::Puzzle;
use crate::state::{GameState, HiddenBar, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Verdict for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Holds the expected letter.
    #[display("correct")]
    Correct,
    /// Empty or holds another letter.
    #[display("wrong")]
    Wrong,
}

/// Correctness marks: grid cells by cell id, hidden bars by bar id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    /// `"r,c"` → mark.
    pub grid: BTreeMap<String, Mark>,
    /// `hiddenN` → per-index marks.
    pub hidden: BTreeMap<String, Vec<Mark>>,
}

impl Marks {
    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty() && self.hidden.is_empty()
    }
}

fn mark(slot: Slot, expected: Option<char>) -> Mark {
    match (slot, expected) {
        (Some(have), Some(want)) if have == want => Mark::Correct,
        _ => Mark::Wrong,
    }
}

fn mark_grid_bar(
    marks: &mut Marks,
    state: &GameState,
    geometry: &Geometry,
    puzzle: &Puzzle,
    bar: GridBarId,
) {
    let expected: Vec<char> = puzzle.grid_answer(bar).chars().collect();
    let letters = state.grid_cells().bar(bar);
    for (i, cell) in geometry.bar(bar).iter().enumerate() {
        let slot = letters.get(i).copied().flatten();
        marks
            .grid
            .insert(cell_id(*cell), mark(slot, expected.get(i).copied()));
    }
}

fn mark_hidden_bars<'a>(
    marks: &mut Marks,
    puzzle: &Puzzle,
    bars: impl Iterator<Item = &'a HiddenBar>,
) {
    for bar in bars {
        let expected: Vec<char> = puzzle
            .hidden_answer(bar.id)
            .unwrap_or_default()
            .chars()
            .collect();
        let row = bar
            .letters
            .iter()
            .enumerate()
            .map(|(i, slot)| mark(*slot, expected.get(i).copied()))
            .collect();
        marks.hidden.insert(bar.id.to_string(), row);
    }
}

/// Marks the active bar only.
#[instrument(skip_all, fields(bar = %state.active().bar))]
pub fn check_word(state: &GameState, geometry: &Geometry, puzzle: &Puzzle) -> Marks {
    let mut marks = Marks::default();
    match state.active().bar {
        BarId::Grid(bar) => mark_grid_bar(&mut marks, state, geometry, puzzle, bar),
        BarId::Hidden(id) => mark_hidden_bars(
            &mut marks,
            puzzle,
            state.hidden_cells().iter().filter(|b| b.id == id),
        ),
    }
    marks
}

/// Marks every grid cell and every hidden bar.
#[instrument(skip_all, fields(puzzle_id = %state.puzzle_id()))]
pub fn check_puzzle(state: &GameState, geometry: &Geometry, puzzle: &Puzzle) -> Marks {
    let mut marks = Marks::default();
    for bar in GridBarId::ALL {
        mark_grid_bar(&mut marks, state, geometry, puzzle, bar);
    }
    mark_hidden_bars(&mut marks, puzzle, state.hidden_cells().iter());
    let wrong = marks.grid.values().filter(|m| **m == Mark::Wrong).count();
    debug!(grid_cells = marks.grid.len(), wrong, "Checked puzzle");
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::{HiddenBarId, Scope};
    use crate::event::GridEvent;
    use crate::fixtures::sample_puzzle;
    use crate::reducer::reduce;

    fn play(events: &[GridEvent]) -> GameState {
        let geometry = Geometry::septago();
        let start = GameState::init(&sample_puzzle(), geometry);
        events.iter().fold(start, |s, e| reduce(&s, e, geometry))
    }

    #[test]
    fn test_check_word_marks_active_grid_bar() {
        let state = play(&[GridEvent::input_letter("P"), GridEvent::input_letter("X")]);
        let marks = check_word(&state, Geometry::septago(), &sample_puzzle());
        assert_eq!(marks.grid.len(), 7);
        assert_eq!(marks.grid["1,0"], Mark::Correct);
        assert_eq!(marks.grid["1,1"], Mark::Wrong);
        assert_eq!(marks.grid["1,6"], Mark::Wrong);
        assert!(marks.hidden.is_empty());
    }

    #[test]
    fn test_check_word_marks_active_hidden_bar() {
        let hidden2 = HiddenBarId::from_position(1).unwrap();
        let state = play(&[
            GridEvent::set_active_bar(Scope::Hidden, hidden2, None),
            GridEvent::input_letter("L"),
            GridEvent::input_letter("O"),
        ]);
        let marks = check_word(&state, Geometry::septago(), &sample_puzzle());
        assert!(marks.grid.is_empty());
        assert_eq!(
            marks.hidden["hidden2"],
            [Mark::Correct, Mark::Wrong, Mark::Wrong, Mark::Wrong, Mark::Wrong, Mark::Wrong]
        );
    }

    #[test]
    fn test_check_puzzle_covers_everything() {
        let state = play(&[GridEvent::input_letter("P")]);
        let marks = check_puzzle(&state, Geometry::septago(), &sample_puzzle());
        assert_eq!(marks.grid.len(), 33);
        assert_eq!(marks.hidden.len(), 2);
        let correct = marks.grid.values().filter(|m| **m == Mark::Correct).count();
        assert_eq!(correct, 1);
    }

    #[test]
    fn test_marks_wire_shape() {
        let mut marks = Marks::default();
        assert!(marks.is_empty());
        marks.grid.insert("1,0".into(), Mark::Correct);
        marks.hidden.insert("hidden1".into(), vec![Mark::Wrong]);
        assert_eq!(
            serde_json::to_value(&marks).unwrap(),
            serde_json::json!({"grid": {"1,0": "correct"}, "hidden": {"hidden1": ["wrong"]}})
        );
    }
}
