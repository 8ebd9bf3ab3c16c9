//! Shared puzzle fixtures for unit tests.

use crate::{Geometry, Puzzle};

/// A consistent puzzle: every intersection letter agrees across bars.
pub(crate) const SAMPLE_PUZZLE: &str = r#"{
  "schema_version": "puzzlefile.v2",
  "meta": { "id": "sample", "title": "Sample" },
  "answers": {
    "h1": "PARADES", "h2": "CABINET", "h3": "LATERAL",
    "v1": "BANANAS", "v2": "RADIXES", "v3": "SEVERAL",
    "hidden": ["SILENT", "LISTEN"]
  },
  "clues": {
    "h1": "Marches", "h2": "Cupboard", "h3": "Sideways",
    "v1": "Fruit", "v2": "Roots", "v3": "Some",
    "hidden": ["Quiet", "Hear"]
  }
}"#;

/// Same grid with a single three-letter hidden bar and no meta id.
pub(crate) const SINGLE_HIDDEN_PUZZLE: &str = r#"{
  "schema_version": "puzzlefile.v2",
  "answers": {
    "h1": "PARADES", "h2": "CABINET", "h3": "LATERAL",
    "v1": "BANANAS", "v2": "RADIXES", "v3": "SEVERAL",
    "hidden": ["ACE"]
  },
  "clues": {
    "h1": "Marches", "h2": "Cupboard", "h3": "Sideways",
    "v1": "Fruit", "v2": "Roots", "v3": "Some",
    "hidden": [""]
  }
}"#;

pub(crate) fn sample_puzzle() -> Puzzle {
    Puzzle::from_json_str(SAMPLE_PUZZLE, "sample.json", Geometry::septago())
        .unwrap_or_else(|e| panic!("sample puzzle must load: {e}"))
}

pub(crate) fn single_hidden_puzzle() -> Puzzle {
    Puzzle::from_json_str(SINGLE_HIDDEN_PUZZLE, "single.json", Geometry::septago())
        .unwrap_or_else(|e| panic!("single-hidden puzzle must load: {e}"))
}
