//! Cross-link invariant: both copies of an intersection letter agree.

use super::Invariant;
use crate::geometry::Geometry;
use crate::state::GameState;

/// Invariant: for every linked pair `(a, b)`, `grid[a] == grid[b]`.
pub struct CrossLinkInvariant;

impl Invariant for CrossLinkInvariant {
    fn holds(state: &GameState, geometry: &Geometry) -> bool {
        geometry
            .cross_links()
            .all(|(a, b)| state.grid_cells().get(a) == state.grid_cells().get(b))
    }

    fn description() -> &'static str {
        "Letters at cross-linked intersection positions are equal"
    }
}
