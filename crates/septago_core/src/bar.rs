//! Bar identifiers for the grid and hidden answer slots.

use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;
use strum::{EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Whether a bar is drawn on the grid or lives off-grid as a hidden bar.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    /// One of the six bars on the 7×7 grid.
    #[default]
    #[display("grid")]
    Grid,
    /// An anagram bar that is not placed on the grid.
    #[display("hidden")]
    Hidden,
}

/// Reading direction of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right.
    #[display("horizontal")]
    Horizontal,
    /// Top to bottom.
    #[display("vertical")]
    Vertical,
}

/// The six bars of the Septago grid.
///
/// Declaration order is the clue order: `h1, h2, h3, v1, v2, v3`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    EnumCount,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GridBarId {
    /// Row 1.
    H1,
    /// Row 3.
    H2,
    /// Row 5.
    H3,
    /// Column 1.
    V1,
    /// Column 3.
    V2,
    /// Column 5.
    V3,
}

impl GridBarId {
    /// All grid bars in clue order.
    pub const ALL: [GridBarId; 6] = [
        GridBarId::H1,
        GridBarId::H2,
        GridBarId::H3,
        GridBarId::V1,
        GridBarId::V2,
        GridBarId::V3,
    ];

    /// The horizontal bars, top to bottom.
    pub const HORIZONTAL: [GridBarId; 3] = [GridBarId::H1, GridBarId::H2, GridBarId::H3];

    /// Position of this bar in [`GridBarId::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Which of the three playable lines (0, 1 or 2) this bar runs along.
    pub fn line(self) -> usize {
        self.ordinal() % 3
    }

    /// Reading direction of the bar.
    pub fn direction(self) -> Direction {
        match self {
            GridBarId::H1 | GridBarId::H2 | GridBarId::H3 => Direction::Horizontal,
            GridBarId::V1 | GridBarId::V2 | GridBarId::V3 => Direction::Vertical,
        }
    }

    /// Wire name (`"h1"` .. `"v3"`).
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for GridBarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a hidden bar: `hidden1`, `hidden2`, ...
///
/// Hidden bars are numbered from 1 in the order the puzzle lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HiddenBarId(u8);

impl HiddenBarId {
    const PREFIX: &'static str = "hidden";

    /// Creates the id for the hidden bar at `position` (0-based) in puzzle order.
    pub fn from_position(position: usize) -> Option<Self> {
        u8::try_from(position + 1).ok().map(Self)
    }

    /// 0-based position in puzzle order.
    pub fn position(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl std::fmt::Display for HiddenBarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for HiddenBarId {
    type Err = ParseBarIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only the canonical spelling: no sign, no leading zeros.
        s.strip_prefix(Self::PREFIX)
            .filter(|n| n.bytes().all(|b| b.is_ascii_digit()) && !n.starts_with('0'))
            .and_then(|n| n.parse::<u8>().ok())
            .map(Self)
            .ok_or_else(|| ParseBarIdError::new(s))
    }
}

impl Serialize for HiddenBarId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Any bar a cursor can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
pub enum BarId {
    /// A bar on the grid.
    Grid(GridBarId),
    /// A hidden bar.
    Hidden(HiddenBarId),
}

impl BarId {
    /// Scope the bar belongs to.
    pub fn scope(self) -> Scope {
        match self {
            BarId::Grid(_) => Scope::Grid,
            BarId::Hidden(_) => Scope::Hidden,
        }
    }

    /// Reading direction; hidden bars are always horizontal.
    pub fn direction(self) -> Direction {
        match self {
            BarId::Grid(bar) => bar.direction(),
            BarId::Hidden(_) => Direction::Horizontal,
        }
    }
}

impl std::fmt::Display for BarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarId::Grid(bar) => bar.fmt(f),
            BarId::Hidden(bar) => bar.fmt(f),
        }
    }
}

impl Serialize for BarId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A string that does not name a bar.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Unknown bar id: {:?}", input)]
pub struct ParseBarIdError {
    /// The rejected input.
    pub input: String,
}

impl ParseBarIdError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

impl std::error::Error for ParseBarIdError {}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_grid_bar_names_round_trip() {
        for bar in GridBarId::iter() {
            assert_eq!(bar.as_str().parse::<GridBarId>(), Ok(bar));
        }
        assert_eq!(GridBarId::V2.to_string(), "v2");
        assert!("H1".parse::<GridBarId>().is_err());
    }

    #[test]
    fn test_grid_bar_order_matches_all() {
        let iterated: Vec<_> = GridBarId::iter().collect();
        assert_eq!(iterated, GridBarId::ALL.to_vec());
        assert_eq!(GridBarId::COUNT, 6);
    }

    #[test]
    fn test_directions() {
        assert_eq!(GridBarId::H3.direction(), Direction::Horizontal);
        assert_eq!(GridBarId::V1.direction(), Direction::Vertical);
        let hidden = BarId::Hidden(HiddenBarId::from_position(0).unwrap());
        assert_eq!(hidden.direction(), Direction::Horizontal);
        assert_eq!(hidden.scope(), Scope::Hidden);
    }

    #[test]
    fn test_hidden_bar_id_parsing() {
        let first: HiddenBarId = "hidden1".parse().unwrap();
        assert_eq!(first.position(), 0);
        assert_eq!(first.to_string(), "hidden1");
        assert!("hidden0".parse::<HiddenBarId>().is_err());
        assert!("hidden02".parse::<HiddenBarId>().is_err());
        assert!("hidden+2".parse::<HiddenBarId>().is_err());
        assert!("hidden".parse::<HiddenBarId>().is_err());
        assert_eq!("hidden12".parse::<HiddenBarId>().map(|id| id.position()), Ok(11));
        assert!("hiddenX".parse::<HiddenBarId>().is_err());
        assert!("h1".parse::<HiddenBarId>().is_err());
    }

    #[test]
    fn test_scope_parsing_is_case_sensitive() {
        assert_eq!("hidden".parse::<Scope>(), Ok(Scope::Hidden));
        assert!("Hidden".parse::<Scope>().is_err());
    }
}
