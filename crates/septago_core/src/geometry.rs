//! Static geometry of the 7×7 Septago board.
//!
//! Playable cells are the union of rows 1/3/5 and columns 1/3/5 (0-based).
//! Each playable row is a horizontal bar, each playable column a vertical
//! bar, and the nine crossings are the intersections whose letters are
//! shared by two bars. Hidden bars are not part of the geometry.

use crate::bar::{Direction, GridBarId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Board dimension.
pub const SIZE: usize = 7;

/// Rows (and columns) that carry a bar.
const PLAYABLE_LINES: [usize; 3] = [1, 3, 5];

/// A board cell as `(row, col)`.
pub type Cell = (usize, usize);

/// Transport id of a cell: `"r,c"`.
pub fn cell_id(cell: Cell) -> String {
    format!("{},{}", cell.0, cell.1)
}

/// A position inside a grid bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BarPosition {
    /// The bar.
    pub bar: GridBarId,
    /// 0-based index along the bar.
    pub index: usize,
}

impl BarPosition {
    /// Creates a bar position.
    pub fn new(bar: GridBarId, index: usize) -> Self {
        Self { bar, index }
    }
}

impl std::fmt::Display for BarPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.bar, self.index)
    }
}

/// Immutable board geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    playable_mask: [[bool; SIZE]; SIZE],
    /// Cells of each bar in traversal order, indexed by [`GridBarId::ordinal`].
    bars: [Vec<Cell>; 6],
    /// 1 position for ordinary cells, 2 for intersections.
    cell_to_positions: BTreeMap<Cell, Vec<BarPosition>>,
    /// Symmetric pairing of the two positions sharing an intersection.
    cross_map: BTreeMap<BarPosition, BarPosition>,
    /// Canonical intersection order for the display pool (horizontal bars).
    intersections: Vec<BarPosition>,
}

impl Geometry {
    /// Builds the fixed Septago layout.
    #[instrument]
    pub fn build() -> Self {
        let mut playable_mask = [[false; SIZE]; SIZE];
        for (r, row) in playable_mask.iter_mut().enumerate() {
            for (c, playable) in row.iter_mut().enumerate() {
                *playable = PLAYABLE_LINES.contains(&r) || PLAYABLE_LINES.contains(&c);
            }
        }

        let bars = GridBarId::ALL.map(|bar| {
            let line = PLAYABLE_LINES[bar.line()];
            (0..SIZE)
                .map(|i| match bar.direction() {
                    Direction::Horizontal => (line, i),
                    Direction::Vertical => (i, line),
                })
                .collect::<Vec<Cell>>()
        });

        let mut cell_to_positions: BTreeMap<Cell, Vec<BarPosition>> = BTreeMap::new();
        for bar in GridBarId::ALL {
            for (index, cell) in bars[bar.ordinal()].iter().enumerate() {
                cell_to_positions
                    .entry(*cell)
                    .or_default()
                    .push(BarPosition::new(bar, index));
            }
        }

        let mut cross_map = BTreeMap::new();
        for positions in cell_to_positions.values() {
            if let [a, b] = positions.as_slice() {
                cross_map.insert(*a, *b);
                cross_map.insert(*b, *a);
            }
        }

        let intersections = GridBarId::HORIZONTAL
            .iter()
            .flat_map(|bar| PLAYABLE_LINES.iter().map(|c| BarPosition::new(*bar, *c)))
            .collect();

        debug!(
            cells = cell_to_positions.len(),
            linked = cross_map.len(),
            "Built Septago geometry"
        );

        Self {
            playable_mask,
            bars,
            cell_to_positions,
            cross_map,
            intersections,
        }
    }

    /// The process-wide Septago geometry, built on first use.
    pub fn septago() -> &'static Geometry {
        static GEOMETRY: OnceLock<Geometry> = OnceLock::new();
        GEOMETRY.get_or_init(Geometry::build)
    }

    /// Board dimension.
    pub fn size(&self) -> usize {
        SIZE
    }

    /// Row-major playable mask.
    pub fn playable_mask(&self) -> &[[bool; SIZE]; SIZE] {
        &self.playable_mask
    }

    /// Whether a cell is on the board and lies on some bar.
    pub fn is_playable(&self, cell: Cell) -> bool {
        let (r, c) = cell;
        r < SIZE && c < SIZE && self.playable_mask[r][c]
    }

    /// First playable cell in row-major order.
    pub fn first_playable_cell(&self) -> Option<Cell> {
        (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .find(|cell| self.is_playable(*cell))
    }

    /// Cells of a bar in traversal order.
    pub fn bar(&self, bar: GridBarId) -> &[Cell] {
        &self.bars[bar.ordinal()]
    }

    /// Length of a bar.
    pub fn bar_len(&self, bar: GridBarId) -> usize {
        self.bars[bar.ordinal()].len()
    }

    /// Cell at a bar position, if the index is in range.
    pub fn cell_at(&self, position: BarPosition) -> Option<Cell> {
        self.bar(position.bar).get(position.index).copied()
    }

    /// Bar positions covering a cell (empty for black cells).
    pub fn positions_at(&self, cell: Cell) -> &[BarPosition] {
        self.cell_to_positions
            .get(&cell)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The position sharing an intersection with `position`, if any.
    pub fn cross(&self, position: BarPosition) -> Option<BarPosition> {
        self.cross_map.get(&position).copied()
    }

    /// Every linked pair, once in each direction.
    pub fn cross_links(&self) -> impl Iterator<Item = (BarPosition, BarPosition)> + '_ {
        self.cross_map.iter().map(|(a, b)| (*a, *b))
    }

    /// Canonical intersection order for the display pool.
    pub fn intersections(&self) -> &[BarPosition] {
        &self.intersections
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::build()
    }
}
