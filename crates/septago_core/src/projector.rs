//! Render-ready snapshot of a game.
//!
//! [`Props`] is everything a renderer needs and nothing else: it is built
//! from the state, the geometry, the puzzle and the current marks, with no
//! other inputs. Renderers redraw fully when `sync.state_id` changes.

use crate::bar::{BarId, GridBarId};
use crate::check::Marks;
use crate::geometry::{Geometry, SIZE, cell_id};
use crate::puzzle::Puzzle;
use crate::state::{ActiveView, GameState, Slot, derive_intersection_letters, is_complete};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Schema tag of [`Props`].
pub const PROPS_SCHEMA_VERSION: &str = "crossword.v2.props";

/// Highlight flags of a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// The cursor cell.
    pub active_cell: bool,
    /// Any cell of the active bar.
    pub active_slot: bool,
}

/// One of the 49 board cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellProps {
    /// `"r,c"`.
    pub id: String,
    /// Row.
    pub r: usize,
    /// Column.
    pub c: usize,
    /// Not on any bar.
    pub is_black: bool,
    /// On some bar.
    pub is_playable: bool,
    /// Current letter, `""` when empty.
    pub letter: String,
    /// Cursor highlights (grid scope only).
    pub highlight: Highlight,
}

/// Grid section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridProps {
    /// Board dimension.
    pub size: usize,
    /// Cells in row-major order.
    pub cells: Vec<CellProps>,
    /// Bar id → cell ids in traversal order.
    pub bars: BTreeMap<String, Vec<String>>,
    /// `"bar:index"` → `"bar:index"` for every linked position.
    pub cross_map: BTreeMap<String, String>,
    /// Grid bars in clue order.
    pub bar_order: Vec<String>,
}

/// One hidden bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenBarProps {
    /// `hiddenN`.
    pub id: String,
    /// Number of cells.
    pub length: usize,
    /// Letters, `""` when empty.
    pub letters: Vec<String>,
}

/// Hidden section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenProps {
    /// Bars by id.
    pub bars: BTreeMap<String, HiddenBarProps>,
    /// Ids in creation order.
    pub bar_order: Vec<String>,
}

/// The intersection pool: canonical cell ids and their letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionPool {
    /// Cell ids in canonical order.
    pub cells: Vec<String>,
    /// Letters at those cells, `""` when empty.
    pub letters: Vec<String>,
}

/// Clue text keyed by bar id, plus the raw hidden clue list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clues {
    /// Hidden clues in puzzle order.
    pub hidden: Vec<String>,
    /// `h1`..`v3` and `hiddenN` → clue.
    #[serde(flatten)]
    pub by_bar: BTreeMap<String, String>,
}

/// Where the cursor is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    /// The cursor.
    pub active: ActiveView,
}

/// Progress and timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Every cell is filled.
    pub complete: bool,
    /// Whole seconds since `start_time`, never negative.
    pub elapsed_seconds: i64,
    /// `start_time` as Unix seconds.
    pub start_time_epoch: i64,
}

/// Fields a client uses to detect stale renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInfo {
    /// Highest accepted client sequence number.
    pub last_client_seq: i64,
    /// Puzzle being played.
    pub puzzle_id: String,
    /// State generation.
    pub state_id: String,
}

/// Complete render snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Props {
    /// Always [`PROPS_SCHEMA_VERSION`].
    pub schema_version: String,
    /// Grid section.
    pub grid: GridProps,
    /// Hidden section.
    pub hidden: HiddenProps,
    /// Intersection pool.
    pub intersection_pool: IntersectionPool,
    /// Clue text.
    pub clues: Clues,
    /// Cursor.
    pub focus: Focus,
    /// Progress.
    pub status: Status,
    /// Sync bookkeeping.
    pub sync: SyncInfo,
    /// Correctness marks, passed through.
    pub marks: Marks,
}

fn letter_text(slot: Slot) -> String {
    slot.map(String::from).unwrap_or_default()
}

/// Builds props against the current clock.
pub fn project(state: &GameState, geometry: &Geometry, puzzle: &Puzzle, marks: &Marks) -> Props {
    project_at(state, geometry, puzzle, marks, Utc::now())
}

/// Builds props as of `now`.
#[instrument(skip_all, fields(state_id = %state.state_id()))]
pub fn project_at(
    state: &GameState,
    geometry: &Geometry,
    puzzle: &Puzzle,
    marks: &Marks,
    now: DateTime<Utc>,
) -> Props {
    let active = state.active();
    let active_bar = match active.bar {
        BarId::Grid(bar) => Some(geometry.bar(bar)),
        BarId::Hidden(_) => None,
    };
    let active_cell = active_bar.and_then(|cells| cells.get(active.index)).copied();

    let mut cells = Vec::with_capacity(SIZE * SIZE);
    for r in 0..SIZE {
        for c in 0..SIZE {
            let cell = (r, c);
            let playable = geometry.is_playable(cell);
            let letter = geometry
                .positions_at(cell)
                .first()
                .map(|position| letter_text(state.grid_cells().get(*position)))
                .unwrap_or_default();
            let highlight = if playable {
                Highlight {
                    active_cell: active_cell == Some(cell),
                    active_slot: active_bar.is_some_and(|cells| cells.contains(&cell)),
                }
            } else {
                Highlight::default()
            };
            cells.push(CellProps {
                id: cell_id(cell),
                r,
                c,
                is_black: !playable,
                is_playable: playable,
                letter,
                highlight,
            });
        }
    }

    let bars = GridBarId::ALL
        .into_iter()
        .map(|bar| {
            let ids = geometry.bar(bar).iter().map(|cell| cell_id(*cell)).collect();
            (bar.to_string(), ids)
        })
        .collect();
    let cross_map = geometry
        .cross_links()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

    let hidden_bars: BTreeMap<String, HiddenBarProps> = state
        .hidden_cells()
        .iter()
        .map(|bar| {
            let id = bar.id.to_string();
            let props = HiddenBarProps {
                id: id.clone(),
                length: bar.letters.len(),
                letters: bar.letters.iter().map(|slot| letter_text(*slot)).collect(),
            };
            (id, props)
        })
        .collect();
    let hidden_order = state
        .hidden_cells()
        .iter()
        .map(|bar| bar.id.to_string())
        .collect();

    let intersection_pool = IntersectionPool {
        cells: geometry
            .intersections()
            .iter()
            .filter_map(|position| geometry.cell_at(*position))
            .map(cell_id)
            .collect(),
        letters: derive_intersection_letters(state, geometry),
    };

    let mut by_bar: BTreeMap<String, String> = GridBarId::ALL
        .into_iter()
        .map(|bar| (bar.to_string(), puzzle.grid_clue(bar).to_string()))
        .collect();
    for bar in state.hidden_cells().iter() {
        let clue = puzzle.hidden_clue(bar.id).unwrap_or_default();
        by_bar.insert(bar.id.to_string(), clue.to_string());
    }

    let start = state.start_time();
    let elapsed_seconds = (now - start).num_seconds().max(0);

    Props {
        schema_version: PROPS_SCHEMA_VERSION.to_string(),
        grid: GridProps {
            size: geometry.size(),
            cells,
            bars,
            cross_map,
            bar_order: GridBarId::ALL.iter().map(ToString::to_string).collect(),
        },
        hidden: HiddenProps {
            bars: hidden_bars,
            bar_order: hidden_order,
        },
        intersection_pool,
        clues: Clues {
            hidden: puzzle.hidden_clues().to_vec(),
            by_bar,
        },
        focus: Focus {
            active: active.into(),
        },
        status: Status {
            complete: is_complete(state),
            elapsed_seconds,
            start_time_epoch: start.timestamp(),
        },
        sync: SyncInfo {
            last_client_seq: state.last_client_seq(),
            puzzle_id: state.puzzle_id().to_string(),
            state_id: state.state_id().to_string(),
        },
        marks: marks.clone(),
    }
}
