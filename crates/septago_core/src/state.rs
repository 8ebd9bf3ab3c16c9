//! Game state snapshots.
//!
//! A [`GameState`] is never edited in place once published: the reducer
//! clones the previous snapshot and returns the modified copy, so older
//! snapshots stay valid for logging and comparison.

use crate::bar::{BarId, Direction, GridBarId, HiddenBarId, Scope};
use crate::geometry::{BarPosition, Geometry};
use crate::puzzle::Puzzle;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

/// One cell: a letter A–Z or empty.
pub type Slot = Option<char>;

/// Index of the first empty slot, or 0 if the bar is full.
pub fn first_empty_index(slots: &[Slot]) -> usize {
    slots.iter().position(Option::is_none).unwrap_or(0)
}

/// Clamps a requested index into `[0, len - 1]` (0 for an empty bar).
pub(crate) fn clamp_index(index: i64, len: usize) -> usize {
    let max = len.saturating_sub(1);
    usize::try_from(index.max(0)).map_or(max, |i| i.min(max))
}

/// Letters of the six grid bars.
///
/// Intersection cells are stored once per bar; the reducer keeps both copies
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLetters([Vec<Slot>; 6]);

impl GridLetters {
    /// Empty bars sized by the geometry.
    pub fn empty(geometry: &Geometry) -> Self {
        Self(GridBarId::ALL.map(|bar| vec![None; geometry.bar_len(bar)]))
    }

    /// Letters of one bar.
    pub fn bar(&self, bar: GridBarId) -> &[Slot] {
        &self.0[bar.ordinal()]
    }

    /// Letter at a bar position (empty when out of range).
    pub fn get(&self, position: BarPosition) -> Slot {
        self.bar(position.bar)
            .get(position.index)
            .copied()
            .flatten()
    }

    /// Bars in clue order.
    pub fn iter(&self) -> impl Iterator<Item = (GridBarId, &[Slot])> {
        GridBarId::ALL
            .into_iter()
            .map(move |bar| (bar, self.bar(bar)))
    }

    /// Writes a slot; out-of-range positions are ignored.
    pub(crate) fn set(&mut self, position: BarPosition, slot: Slot) {
        if let Some(cell) = self.0[position.bar.ordinal()].get_mut(position.index) {
            *cell = slot;
        }
    }

    /// Writes a slot and, at an intersection, its partner.
    pub(crate) fn set_linked(&mut self, geometry: &Geometry, position: BarPosition, slot: Slot) {
        self.set(position, slot);
        if let Some(partner) = geometry.cross(position) {
            self.set(partner, slot);
        }
    }

    fn cleared(&self) -> Self {
        Self(self.0.clone().map(|bar| vec![None; bar.len()]))
    }
}

/// Letters of one hidden bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenBar {
    /// Bar id.
    pub id: HiddenBarId,
    /// Letters, sized by the hidden answer.
    pub letters: Vec<Slot>,
}

/// Hidden bars in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HiddenLetters(Vec<HiddenBar>);

impl HiddenLetters {
    /// One empty bar per hidden answer, named `hidden1`, `hidden2`, ...
    pub fn for_puzzle(puzzle: &Puzzle) -> Self {
        Self(
            puzzle
                .hidden_answers()
                .iter()
                .enumerate()
                .filter_map(|(i, answer)| {
                    HiddenBarId::from_position(i).map(|id| HiddenBar {
                        id,
                        letters: vec![None; answer.chars().count()],
                    })
                })
                .collect(),
        )
    }

    /// Letters of a hidden bar, if it exists.
    pub fn get(&self, id: HiddenBarId) -> Option<&[Slot]> {
        self.0
            .iter()
            .find(|bar| bar.id == id)
            .map(|bar| bar.letters.as_slice())
    }

    pub(crate) fn get_mut(&mut self, id: HiddenBarId) -> Option<&mut Vec<Slot>> {
        self.0
            .iter_mut()
            .find(|bar| bar.id == id)
            .map(|bar| &mut bar.letters)
    }

    /// First hidden bar in creation order.
    pub fn first_id(&self) -> Option<HiddenBarId> {
        self.0.first().map(|bar| bar.id)
    }

    /// Bars in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &HiddenBar> {
        self.0.iter()
    }

    /// Number of hidden bars.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no hidden bars.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn cleared(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|bar| HiddenBar {
                    id: bar.id,
                    letters: vec![None; bar.letters.len()],
                })
                .collect(),
        )
    }
}

/// The cursor: a bar and an index into it.
///
/// Scope and direction follow from the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "ActiveView")]
pub struct ActiveRef {
    /// Focused bar.
    pub bar: BarId,
    /// 0-based index along the bar.
    pub index: usize,
}

impl ActiveRef {
    /// Creates a cursor.
    pub fn new(bar: impl Into<BarId>, index: usize) -> Self {
        Self {
            bar: bar.into(),
            index,
        }
    }

    /// Start position: `h1`, index 0.
    pub fn home() -> Self {
        Self::new(GridBarId::H1, 0)
    }

    /// Scope of the focused bar.
    pub fn scope(&self) -> Scope {
        self.bar.scope()
    }

    /// Reading direction of the focused bar.
    pub fn direction(&self) -> Direction {
        self.bar.direction()
    }
}

/// Wire form of the cursor: `{scope, bar_id, index, direction}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ActiveView {
    /// `grid` or `hidden`.
    pub scope: Scope,
    /// Bar id (`h1`..`v3`, `hidden1`, `hidden2`).
    pub bar_id: String,
    /// 0-based index.
    pub index: usize,
    /// `horizontal` or `vertical`.
    pub direction: Direction,
}

impl From<ActiveRef> for ActiveView {
    fn from(active: ActiveRef) -> Self {
        Self {
            scope: active.scope(),
            bar_id: active.bar.to_string(),
            index: active.index,
            direction: active.direction(),
        }
    }
}

/// Entry of the clue-cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClueRef {
    /// `grid` or `hidden`.
    pub scope: Scope,
    /// The bar.
    pub bar_id: BarId,
    /// Bar length.
    pub length: usize,
}

impl ClueRef {
    fn new(bar: impl Into<BarId>, length: usize) -> Self {
        let bar_id = bar.into();
        Self {
            scope: bar_id.scope(),
            bar_id,
            length,
        }
    }
}

/// Opaque id of a state generation; changes on init and reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(transparent)]
pub struct StateId(Uuid);

impl StateId {
    /// A fresh random id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether a client-supplied id names this generation.
    pub fn matches(&self, other: &str) -> bool {
        Uuid::parse_str(other).is_ok_and(|id| id == self.0)
    }
}

/// Diagnostic tag for the most recent transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(into = "String")]
pub enum LastAction {
    /// Fresh state.
    #[display("init")]
    Init,
    /// Everything cleared.
    #[display("reset")]
    Reset,
    /// Cursor moved to a bar.
    #[display("set_active")]
    SetActive,
    /// Cursor moved within the bar.
    #[display("move")]
    Move,
    /// Cursor already at the edge.
    #[display("move:edge")]
    MoveEdge,
    /// Active bar has no cells.
    #[display("move:empty")]
    MoveEmpty,
    /// Letter written in the given scope.
    #[display("input:{}", _0)]
    Input(Scope),
    /// Letter was not a single A–Z character.
    #[display("input:ignored")]
    InputIgnored,
    /// Active hidden bar does not exist.
    #[display("input:hidden_missing")]
    InputHiddenMissing,
    /// Active index outside the bar.
    #[display("input:oob")]
    InputOutOfBounds,
    /// Active cell cleared.
    #[display("bksp:{}_clear", _0)]
    BackspaceClear(Scope),
    /// Cursor stepped back and cleared the previous cell.
    #[display("bksp:{}_prev_clear", _0)]
    BackspacePrevClear(Scope),
    /// Empty first cell; nothing to delete.
    #[display("bksp:{}_edge", _0)]
    BackspaceEdge(Scope),
    /// Active bar has no cells.
    #[display("bksp:{}_empty", _0)]
    BackspaceEmpty(Scope),
    /// Active hidden bar does not exist.
    #[display("bksp:hidden_missing")]
    BackspaceHiddenMissing,
    /// Heartbeat.
    #[display("tick")]
    Tick,
    /// Unrecognized event tag.
    #[display("ignored:{}", _0)]
    Ignored(String),
}

impl From<LastAction> for String {
    fn from(action: LastAction) -> Self {
        action.to_string()
    }
}

/// A game snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub(crate) puzzle_id: String,
    pub(crate) state_id: StateId,
    pub(crate) grid_cells: GridLetters,
    pub(crate) hidden_cells: HiddenLetters,
    pub(crate) active: ActiveRef,
    pub(crate) clue_order: Vec<ClueRef>,
    pub(crate) start_time: DateTime<Utc>,
    pub(crate) last_client_seq: i64,
    pub(crate) last_action: LastAction,
}

impl GameState {
    /// Creates the initial state for a puzzle.
    #[instrument(skip_all, fields(puzzle_id = %puzzle.puzzle_id()))]
    pub fn init(puzzle: &Puzzle, geometry: &Geometry) -> Self {
        let grid_cells = GridLetters::empty(geometry);
        let hidden_cells = HiddenLetters::for_puzzle(puzzle);

        let clue_order = GridBarId::ALL
            .into_iter()
            .map(|bar| ClueRef::new(bar, geometry.bar_len(bar)))
            .chain(
                hidden_cells
                    .iter()
                    .map(|bar| ClueRef::new(bar.id, bar.letters.len())),
            )
            .collect();

        let state = Self {
            puzzle_id: puzzle.puzzle_id().to_string(),
            state_id: StateId::fresh(),
            grid_cells,
            hidden_cells,
            active: ActiveRef::home(),
            clue_order,
            start_time: Utc::now(),
            last_client_seq: 0,
            last_action: LastAction::Init,
        };
        info!(
            state_id = %state.state_id,
            hidden_bars = state.hidden_cells.len(),
            "Initialized game state"
        );
        state
    }

    /// Id of the puzzle being played.
    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    /// Generation id.
    pub fn state_id(&self) -> StateId {
        self.state_id
    }

    /// Grid letters.
    pub fn grid_cells(&self) -> &GridLetters {
        &self.grid_cells
    }

    /// Hidden letters.
    pub fn hidden_cells(&self) -> &HiddenLetters {
        &self.hidden_cells
    }

    /// The cursor.
    pub fn active(&self) -> ActiveRef {
        self.active
    }

    /// Clue-cycling order.
    pub fn clue_order(&self) -> &[ClueRef] {
        &self.clue_order
    }

    /// When this generation started.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Highest accepted client sequence number.
    pub fn last_client_seq(&self) -> i64 {
        self.last_client_seq
    }

    /// Diagnostic tag of the last transition.
    pub fn last_action(&self) -> &LastAction {
        &self.last_action
    }

    /// Letters of any bar, if it exists.
    pub fn letters(&self, bar: BarId) -> Option<&[Slot]> {
        match bar {
            BarId::Grid(id) => Some(self.grid_cells.bar(id)),
            BarId::Hidden(id) => self.hidden_cells.get(id),
        }
    }

    /// Cleared letters, home cursor, new id and clock; keeps the puzzle.
    pub(crate) fn reset_in_place(&mut self) {
        self.grid_cells = self.grid_cells.cleared();
        self.hidden_cells = self.hidden_cells.cleared();
        self.state_id = StateId::fresh();
        self.active = ActiveRef::home();
        self.start_time = Utc::now();
        self.last_client_seq = 0;
    }
}

/// Letters at the canonical intersections, `""` when unset.
pub fn derive_intersection_letters(state: &GameState, geometry: &Geometry) -> Vec<String> {
    geometry
        .intersections()
        .iter()
        .map(|position| {
            state
                .grid_cells
                .get(*position)
                .map(String::from)
                .unwrap_or_default()
        })
        .collect()
}

/// Whether every grid and hidden cell holds a letter.
pub fn is_complete(state: &GameState) -> bool {
    let grid_full = state
        .grid_cells
        .iter()
        .all(|(_, letters)| letters.iter().all(Option::is_some));
    let hidden_full = state
        .hidden_cells
        .iter()
        .all(|bar| bar.letters.iter().all(Option::is_some));
    grid_full && hidden_full
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_puzzle, single_hidden_puzzle};

    #[test]
    fn test_init_allocates_empty_bars() {
        let geometry = Geometry::septago();
        let state = GameState::init(&sample_puzzle(), geometry);
        for (bar, letters) in state.grid_cells().iter() {
            assert_eq!(letters.len(), geometry.bar_len(bar));
            assert!(letters.iter().all(Option::is_none));
        }
        let hidden: Vec<_> = state
            .hidden_cells()
            .iter()
            .map(|b| (b.id.to_string(), b.letters.len()))
            .collect();
        assert_eq!(hidden, [("hidden1".to_string(), 6), ("hidden2".to_string(), 6)]);
        assert_eq!(state.active(), ActiveRef::home());
        assert_eq!(state.last_client_seq(), 0);
        assert_eq!(state.last_action().to_string(), "init");
        assert_eq!(state.puzzle_id(), "sample");
    }

    #[test]
    fn test_clue_order_is_grid_then_hidden() {
        let state = GameState::init(&single_hidden_puzzle(), Geometry::septago());
        let order: Vec<String> = state.clue_order().iter().map(|c| c.bar_id.to_string()).collect();
        assert_eq!(order, ["h1", "h2", "h3", "v1", "v2", "v3", "hidden1"]);
        let last = state.clue_order().last().unwrap();
        assert_eq!(last.scope, Scope::Hidden);
        assert_eq!(last.length, 3);
        assert_eq!(state.puzzle_id(), "single.json");
    }

    #[test]
    fn test_each_init_gets_a_new_state_id() {
        let puzzle = sample_puzzle();
        let a = GameState::init(&puzzle, Geometry::septago());
        let b = GameState::init(&puzzle, Geometry::septago());
        assert_ne!(a.state_id(), b.state_id());
        assert!(a.state_id().matches(&a.state_id().to_string()));
        assert!(!a.state_id().matches("not-a-uuid"));
    }

    #[test]
    fn test_first_empty_index() {
        assert_eq!(first_empty_index(&[Some('A'), None, Some('C')]), 1);
        assert_eq!(first_empty_index(&[Some('A'), Some('B')]), 0);
        assert_eq!(first_empty_index(&[]), 0);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-4, 7), 0);
        assert_eq!(clamp_index(3, 7), 3);
        assert_eq!(clamp_index(99, 7), 6);
        assert_eq!(clamp_index(2, 0), 0);
    }

    #[test]
    fn test_active_view_wire_shape() {
        let active = ActiveRef::new(GridBarId::V2, 4);
        let json = serde_json::to_value(active).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "scope": "grid",
                "bar_id": "v2",
                "index": 4,
                "direction": "vertical"
            })
        );
    }

    #[test]
    fn test_derived_queries_on_fresh_state() {
        let geometry = Geometry::septago();
        let state = GameState::init(&sample_puzzle(), geometry);
        assert_eq!(derive_intersection_letters(&state, geometry), vec![String::new(); 9]);
        assert!(!is_complete(&state));
    }
}
