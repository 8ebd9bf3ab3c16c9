//! Puzzle files: loading, validation and listing.
//!
//! A puzzle file is JSON tagged with `schema_version: "puzzlefile.v2"`:
//!
//! ```json
//! {
//!   "schema_version": "puzzlefile.v2",
//!   "meta":    { "id": "...", "title": "..." },
//!   "answers": { "h1": "PARADES", "...": "...", "hidden": ["SILENT"] },
//!   "clues":   { "h1": "Marches", "...": "...", "hidden": ["Quiet"] }
//! }
//! ```
//!
//! Validation stops at the first problem found. Once a [`Puzzle`] exists it
//! is trusted by the rest of the crate.

use crate::bar::{GridBarId, HiddenBarId};
use crate::geometry::Geometry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// The only puzzle schema this crate accepts.
pub const PUZZLE_SCHEMA_VERSION: &str = "puzzlefile.v2";

/// Comma-separated bar list for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarList(pub Vec<GridBarId>);

impl std::fmt::Display for BarList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|b| b.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Why a puzzle could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PuzzleError {
    /// The file could not be read.
    #[display("Failed to read puzzle file {}: {}", path, message)]
    Io {
        /// Path that failed.
        path: String,
        /// OS error text.
        message: String,
    },

    /// The text is not JSON.
    #[display("Puzzle is not valid JSON: {}", _0)]
    Json(String),

    /// The JSON root is not an object.
    #[display("Puzzle root must be a JSON object")]
    NotAnObject,

    /// `schema_version` is missing or not [`PUZZLE_SCHEMA_VERSION`].
    #[display(
        "Unsupported or missing schema_version: {:?}. Expected '{}'.",
        _0,
        PUZZLE_SCHEMA_VERSION
    )]
    UnsupportedSchema(String),

    /// Some grid answers are absent.
    #[display("Puzzle missing required grid answers: {}", _0)]
    MissingGridAnswers(BarList),

    /// A grid answer is blank after normalization.
    #[display("answers.{} missing non-empty string", _0)]
    EmptyGridAnswer(GridBarId),

    /// An answer contains something other than A–Z.
    #[display("Invalid character '{}' in string '{}'. Only A-Z allowed.", ch, value)]
    InvalidCharacter {
        /// Offending character.
        ch: char,
        /// Normalized answer containing it.
        value: String,
    },

    /// A grid answer does not fit its bar.
    #[display("answers.{} length {} != required {}", bar, length, required)]
    AnswerLength {
        /// The bar.
        bar: GridBarId,
        /// Length of the answer.
        length: usize,
        /// Length of the bar.
        required: usize,
    },

    /// `answers.hidden` is missing, empty or not an array.
    #[display("answers.hidden must be a non-empty array of 1 or 2 strings")]
    HiddenNotArray,

    /// `answers.hidden` has more than two entries.
    #[display("answers.hidden must have length 1 or 2 (got {})", _0)]
    HiddenCount(usize),

    /// A hidden answer is blank after normalization.
    #[display("answers.hidden[{}] missing non-empty string", _0)]
    EmptyHiddenAnswer(usize),

    /// A grid clue is blank.
    #[display("clues.{} missing non-empty string", _0)]
    EmptyGridClue(GridBarId),

    /// `clues.hidden` is not an array matching `answers.hidden`.
    #[display("clues.hidden must be an array with the same length as answers.hidden")]
    HiddenCluesMismatch,
}

impl std::error::Error for PuzzleError {}

/// Free-form puzzle metadata. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PuzzleMeta {
    /// Stable puzzle id.
    pub id: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Display subtitle.
    pub subtitle: Option<String>,
    /// Author credit.
    pub author: Option<String>,
    /// Publication date.
    pub date: Option<String>,
    /// Difficulty label.
    pub difficulty: Option<String>,
    /// Instructions shown instead of the default help text.
    pub instructions: Option<String>,
}

impl PuzzleMeta {
    fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let field = |key: &str| map.get(key).and_then(text_of);
        Self {
            id: field("id"),
            title: field("title"),
            subtitle: field("subtitle"),
            author: field("author"),
            date: field("date"),
            difficulty: field("difficulty"),
            instructions: field("instructions"),
        }
    }
}

/// A validated puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Puzzle {
    schema_version: String,
    meta: PuzzleMeta,
    /// Normalized answers indexed by [`GridBarId::ordinal`].
    grid_answers: [String; 6],
    hidden_answers: Vec<String>,
    grid_clues: [String; 6],
    hidden_clues: Vec<String>,
    filename: String,
}

impl Puzzle {
    /// Parses and validates puzzle JSON.
    ///
    /// `filename` is the puzzle's source file name, used as its id when the
    /// metadata carries none.
    ///
    /// # Errors
    ///
    /// Returns the first validation problem found.
    #[instrument(skip(raw, geometry))]
    pub fn from_json_str(
        raw: &str,
        filename: &str,
        geometry: &Geometry,
    ) -> Result<Self, PuzzleError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| PuzzleError::Json(e.to_string()))?;
        let result = Self::from_value(&value, filename, geometry);
        if let Err(e) = &result {
            warn!(filename, error = %e, "Puzzle rejected");
        }
        result
    }

    fn from_value(value: &Value, filename: &str, geometry: &Geometry) -> Result<Self, PuzzleError> {
        let root = value.as_object().ok_or(PuzzleError::NotAnObject)?;

        let schema_version = root
            .get("schema_version")
            .and_then(text_of)
            .unwrap_or_default()
            .trim()
            .to_string();
        if schema_version != PUZZLE_SCHEMA_VERSION {
            return Err(PuzzleError::UnsupportedSchema(schema_version));
        }

        let empty = Map::new();
        let answers = object_or_empty(root.get("answers"), &empty);
        let clues = object_or_empty(root.get("clues"), &empty);

        let missing: Vec<GridBarId> = GridBarId::ALL
            .into_iter()
            .filter(|bar| !answers.contains_key(bar.as_str()))
            .collect();
        if !missing.is_empty() {
            return Err(PuzzleError::MissingGridAnswers(BarList(missing)));
        }

        let mut grid_answers: [String; 6] = Default::default();
        for bar in GridBarId::ALL {
            let answer = normalize_letters(answers.get(bar.as_str()));
            if answer.is_empty() {
                return Err(PuzzleError::EmptyGridAnswer(bar));
            }
            validate_letters_only(&answer)?;
            let required = geometry.bar_len(bar);
            let length = answer.chars().count();
            if length != required {
                return Err(PuzzleError::AnswerLength {
                    bar,
                    length,
                    required,
                });
            }
            grid_answers[bar.ordinal()] = answer;
        }

        let hidden = match answers.get("hidden") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(PuzzleError::HiddenNotArray),
        };
        if !(1..=2).contains(&hidden.len()) {
            return Err(PuzzleError::HiddenCount(hidden.len()));
        }
        let mut hidden_answers = Vec::with_capacity(hidden.len());
        for (i, item) in hidden.iter().enumerate() {
            let answer = normalize_letters(Some(item));
            if answer.is_empty() {
                return Err(PuzzleError::EmptyHiddenAnswer(i));
            }
            validate_letters_only(&answer)?;
            hidden_answers.push(answer);
        }

        let mut grid_clues: [String; 6] = Default::default();
        for bar in GridBarId::ALL {
            let clue = clues
                .get(bar.as_str())
                .and_then(text_of)
                .unwrap_or_default()
                .trim()
                .to_string();
            if clue.is_empty() {
                return Err(PuzzleError::EmptyGridClue(bar));
            }
            grid_clues[bar.ordinal()] = clue;
        }

        let hidden_clues: Vec<String> = match clues.get("hidden") {
            Some(Value::Array(items)) if items.len() == hidden_answers.len() => items
                .iter()
                .map(|v| text_of(v).unwrap_or_default().trim().to_string())
                .collect(),
            _ => return Err(PuzzleError::HiddenCluesMismatch),
        };

        let puzzle = Self {
            schema_version,
            meta: PuzzleMeta::from_value(root.get("meta")),
            grid_answers,
            hidden_answers,
            grid_clues,
            hidden_clues,
            filename: filename.to_string(),
        };
        debug!(
            puzzle_id = %puzzle.puzzle_id(),
            hidden = puzzle.hidden_answers.len(),
            "Puzzle validated"
        );
        Ok(puzzle)
    }

    /// Schema tag of the source file.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Metadata block.
    pub fn meta(&self) -> &PuzzleMeta {
        &self.meta
    }

    /// Source file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// `meta.id` if present, else the file name.
    pub fn puzzle_id(&self) -> &str {
        self.meta.id.as_deref().unwrap_or(&self.filename)
    }

    /// Normalized answer for a grid bar.
    pub fn grid_answer(&self, bar: GridBarId) -> &str {
        &self.grid_answers[bar.ordinal()]
    }

    /// Clue for a grid bar.
    pub fn grid_clue(&self, bar: GridBarId) -> &str {
        &self.grid_clues[bar.ordinal()]
    }

    /// Hidden answers in puzzle order (1 or 2).
    pub fn hidden_answers(&self) -> &[String] {
        &self.hidden_answers
    }

    /// Hidden clues in puzzle order; may be blank.
    pub fn hidden_clues(&self) -> &[String] {
        &self.hidden_clues
    }

    /// Answer for a hidden bar, if the puzzle has that many.
    pub fn hidden_answer(&self, bar: HiddenBarId) -> Option<&str> {
        self.hidden_answers.get(bar.position()).map(String::as_str)
    }

    /// Clue for a hidden bar, if the puzzle has that many.
    pub fn hidden_clue(&self, bar: HiddenBarId) -> Option<&str> {
        self.hidden_clues.get(bar.position()).map(String::as_str)
    }
}

/// Reads and validates a puzzle file.
///
/// # Errors
///
/// Returns [`PuzzleError::Io`] if the file cannot be read, otherwise the
/// first validation problem.
#[instrument(skip(path, geometry), fields(path = %path.as_ref().display()))]
pub fn load_puzzle(path: impl AsRef<Path>, geometry: &Geometry) -> Result<Puzzle, PuzzleError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| PuzzleError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let puzzle = Puzzle::from_json_str(&raw, &filename, geometry)?;
    info!(puzzle_id = %puzzle.puzzle_id(), "Puzzle loaded");
    Ok(puzzle)
}

/// Listing entry for a puzzle file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleSummary {
    /// `meta.id`, defaulting to the file stem.
    pub id: String,
    /// `meta.title`, defaulting to the file stem.
    pub title: String,
    /// `meta.subtitle` or empty.
    pub subtitle: String,
    /// `meta.author` or empty.
    pub author: String,
    /// `meta.date` or empty.
    pub date: String,
    /// `meta.difficulty` or empty.
    pub difficulty: String,
    /// File name inside the puzzle directory.
    pub filename: String,
}

/// Summarizes every `*.json` puzzle in a directory, sorted by file name.
///
/// Files that cannot be read or parsed, or whose root is not a JSON object,
/// are skipped; they are only validated when loaded. A missing directory yields an empty list.
#[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn list_puzzles(dir: impl AsRef<Path>) -> Vec<PuzzleSummary> {
    let Ok(entries) = std::fs::read_dir(dir.as_ref()) else {
        debug!("Puzzle directory not readable");
        return Vec::new();
    };

    let mut filenames: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.to_lowercase().ends_with(".json"))
        .collect();
    filenames.sort();

    let summaries: Vec<PuzzleSummary> = filenames
        .into_iter()
        .filter_map(|filename| {
            let raw = std::fs::read_to_string(dir.as_ref().join(&filename)).ok()?;
            let value: Value = match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!(filename, error = %e, "Skipping unparsable puzzle file");
                    return None;
                }
            };
            if !value.is_object() {
                warn!(filename, "Skipping puzzle file whose root is not an object");
                return None;
            }
            let meta = PuzzleMeta::from_value(value.get("meta"));
            let stem = filename[..filename.len() - ".json".len()].to_string();
            Some(PuzzleSummary {
                id: meta.id.unwrap_or_else(|| stem.clone()),
                title: meta.title.unwrap_or(stem),
                subtitle: meta.subtitle.unwrap_or_default(),
                author: meta.author.unwrap_or_default(),
                date: meta.date.unwrap_or_default(),
                difficulty: meta.difficulty.unwrap_or_default(),
                filename,
            })
        })
        .collect();

    debug!(count = summaries.len(), "Listed puzzles");
    summaries
}

/// Text form of a JSON scalar; `null` counts as absent.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn object_or_empty<'a>(
    value: Option<&'a Value>,
    empty: &'a Map<String, Value>,
) -> &'a Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => empty,
    }
}

/// Uppercases, trims and removes spaces.
fn normalize_letters(value: Option<&Value>) -> String {
    value
        .and_then(text_of)
        .unwrap_or_default()
        .to_uppercase()
        .trim()
        .chars()
        .filter(|ch| *ch != ' ')
        .collect()
}

fn validate_letters_only(value: &str) -> Result<(), PuzzleError> {
    match value.chars().find(|ch| !ch.is_ascii_uppercase()) {
        Some(ch) => Err(PuzzleError::InvalidCharacter {
            ch,
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}
