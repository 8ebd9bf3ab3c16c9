//! Properties every reachable [`GameState`] satisfies.
//!
//! The reducer asserts the full [`SeptagoInvariants`] set after each
//! transition in debug builds; tests check them over random event streams.

use crate::geometry::Geometry;
use crate::state::GameState;

mod bar_shape;
mod cross_link;
mod cursor_bounds;

pub use bar_shape::BarShapeInvariant;
pub use cross_link::CrossLinkInvariant;
pub use cursor_bounds::CursorInBoundsInvariant;

/// A property that must hold for a state on a given board.
pub trait Invariant {
    /// Checks the property.
    fn holds(state: &GameState, geometry: &Geometry) -> bool;

    /// Human-readable description of the property.
    fn description() -> &'static str;
}

/// A failed invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violated: {}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a violation record.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Invariants checked together. Implemented for tuples.
pub trait InvariantSet {
    /// Checks every member, collecting all violations.
    fn check_all(state: &GameState, geometry: &Geometry) -> Result<(), Vec<InvariantViolation>>;
}

impl<I1, I2> InvariantSet for (I1, I2)
where
    I1: Invariant,
    I2: Invariant,
{
    fn check_all(state: &GameState, geometry: &Geometry) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state, geometry) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state, geometry) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<I1, I2, I3> InvariantSet for (I1, I2, I3)
where
    I1: Invariant,
    I2: Invariant,
    I3: Invariant,
{
    fn check_all(state: &GameState, geometry: &Geometry) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = match <(I1, I2)>::check_all(state, geometry) {
            Ok(()) => Vec::new(),
            Err(violations) => violations,
        };
        if !I3::holds(state, geometry) {
            violations.push(InvariantViolation::new(I3::description()));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every Septago state invariant.
pub type SeptagoInvariants = (CrossLinkInvariant, CursorInBoundsInvariant, BarShapeInvariant);
