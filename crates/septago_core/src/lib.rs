//! Septago crossword core - pure puzzle logic.
//!
//! This crate models the fixed 7×7 Septago board and the state machine that
//! turns player input into new game state.
//!
//! # Architecture
//!
//! - **Geometry**: which cells belong to which bar and where bars cross
//! - **Puzzle**: validated answers and clues loaded from `puzzlefile.v2` JSON
//! - **State**: immutable snapshots of the letters, cursor and sync bookkeeping
//! - **Reducer**: `(state, event, geometry) -> state`, total over every event
//! - **Projector**: flat, serializable snapshot for a renderer
//! - **Check**: correctness marks for the active bar or the whole puzzle
//!
//! # Example
//!
//! ```no_run
//! use septago_core::{GameState, Geometry, GridEvent, reduce};
//!
//! # fn example() -> Result<(), septago_core::PuzzleError> {
//! let geometry = Geometry::septago();
//! let puzzle = septago_core::load_puzzle("puzzles/septago-001.json", geometry)?;
//! let state = GameState::init(&puzzle, geometry);
//! let state = reduce(&state, &GridEvent::input_letter("a"), geometry);
//! assert_eq!(state.grid_cells().bar(septago_core::GridBarId::H1)[0], Some('A'));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod bar;
mod check;
mod event;
mod geometry;
mod invariants;
mod projector;
mod puzzle;
mod reducer;
mod state;

#[cfg(test)]
mod fixtures;

// Crate-level exports - Bar identifiers
pub use bar::{BarId, Direction, GridBarId, HiddenBarId, ParseBarIdError, Scope};

// Crate-level exports - Geometry
pub use geometry::{BarPosition, Cell, Geometry, SIZE, cell_id};

// Crate-level exports - Puzzle loading
pub use puzzle::{
    BarList, PUZZLE_SCHEMA_VERSION, Puzzle, PuzzleError, PuzzleMeta, PuzzleSummary, list_puzzles,
    load_puzzle,
};

// Crate-level exports - Game state
pub use state::{
    ActiveRef, ActiveView, ClueRef, GameState, GridLetters, HiddenBar, HiddenLetters, LastAction,
    Slot, StateId, derive_intersection_letters, first_empty_index, is_complete,
};

// Crate-level exports - Events and reducer
pub use event::{EVENT_SCHEMA_VERSION, EventKind, EventPayload, GridEvent, IndexArg};
pub use reducer::reduce;

// Crate-level exports - Invariants
pub use invariants::{
    BarShapeInvariant, CrossLinkInvariant, CursorInBoundsInvariant, Invariant, InvariantSet,
    InvariantViolation, SeptagoInvariants,
};

// Crate-level exports - Presentation
pub use projector::{
    CellProps, Clues, Focus, GridProps, HiddenBarProps, HiddenProps, Highlight,
    IntersectionPool, PROPS_SCHEMA_VERSION, Props, Status, SyncInfo, project, project_at,
};

// Crate-level exports - Answer checking
pub use check::{Mark, Marks, check_puzzle, check_word};
