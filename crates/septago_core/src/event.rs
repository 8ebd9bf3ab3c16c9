//! Events consumed by the reducer.
//!
//! Payload fields are kept as raw JSON so that malformed input reaches the
//! reducer intact and is normalized there rather than rejected at the edge.

use crate::bar::{BarId, Scope};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Schema tag carried by transport envelopes.
pub const EVENT_SCHEMA_VERSION: &str = "crossword.v2";

/// Event type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Type a letter at the cursor.
    InputLetter,
    /// Cursor one cell forward.
    MoveNext,
    /// Cursor one cell back.
    MovePrev,
    /// Focus a bar.
    SetActiveBar,
    /// Delete at or before the cursor.
    Backspace,
    /// Clear the board and start a new generation.
    Reset,
    /// Heartbeat; no effect.
    Tick,
    /// Any other tag, kept verbatim.
    Unrecognized(String),
}

impl EventKind {
    /// Wire tag.
    pub fn tag(&self) -> &str {
        match self {
            EventKind::InputLetter => "INPUT_LETTER",
            EventKind::MoveNext => "MOVE_NEXT",
            EventKind::MovePrev => "MOVE_PREV",
            EventKind::SetActiveBar => "SET_ACTIVE_BAR",
            EventKind::Backspace => "BACKSPACE",
            EventKind::Reset => "RESET",
            EventKind::Tick => "TICK",
            EventKind::Unrecognized(tag) => tag,
        }
    }

    /// Whether the event edits letters (and so invalidates correctness marks).
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            EventKind::InputLetter | EventKind::Backspace | EventKind::Reset
        )
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        match tag {
            "INPUT_LETTER" => EventKind::InputLetter,
            "MOVE_NEXT" => EventKind::MoveNext,
            "MOVE_PREV" => EventKind::MovePrev,
            "SET_ACTIVE_BAR" => EventKind::SetActiveBar,
            "BACKSPACE" => EventKind::Backspace,
            "RESET" => EventKind::Reset,
            "TICK" => EventKind::Tick,
            other => EventKind::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        EventKind::from(tag.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.tag().to_string()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// How the `index` payload field was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexArg {
    /// Absent or null.
    Omitted,
    /// Present; values that are not integers read as 0.
    Given(i64),
}

/// Event payload. Every field is optional and loosely typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Letter for `INPUT_LETTER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<Value>,
    /// Scope for `SET_ACTIVE_BAR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
    /// Bar for `SET_ACTIVE_BAR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_id: Option<Value>,
    /// Cursor index for `SET_ACTIVE_BAR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    /// Client sequence number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_seq: Option<Value>,
    /// State generation the client saw when it sent the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<Value>,
}

impl EventPayload {
    /// Letter as text (`""` when absent).
    pub fn letter_text(&self) -> String {
        text_of(self.letter.as_ref()).unwrap_or_default()
    }

    /// Scope as text, if supplied.
    pub fn scope_text(&self) -> Option<String> {
        text_of(self.scope.as_ref())
    }

    /// Bar id as text, if supplied.
    pub fn bar_id_text(&self) -> Option<String> {
        text_of(self.bar_id.as_ref())
    }

    /// Cursor index argument.
    pub fn index(&self) -> IndexArg {
        match self.index.as_ref() {
            None | Some(Value::Null) => IndexArg::Omitted,
            Some(value) => IndexArg::Given(loose_int(value).unwrap_or(0)),
        }
    }

    /// Client sequence number, if present and integer-like.
    pub fn client_seq(&self) -> Option<i64> {
        self.client_seq.as_ref().and_then(loose_int)
    }

    /// Prior state id, if supplied.
    pub fn state_id(&self) -> Option<String> {
        text_of(self.state_id.as_ref())
    }
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer reading of a JSON scalar: numbers truncate, strings parse, booleans are 0/1.
fn loose_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An event: `{type, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEvent {
    /// Event tag.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Event payload; `null` or absent reads as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: EventPayload,
}

impl GridEvent {
    /// An event with an empty payload.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            payload: EventPayload::default(),
        }
    }

    /// `INPUT_LETTER` with the given text.
    pub fn input_letter(letter: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::InputLetter);
        event.payload.letter = Some(Value::String(letter.into()));
        event
    }

    /// `MOVE_NEXT`.
    pub fn move_next() -> Self {
        Self::new(EventKind::MoveNext)
    }

    /// `MOVE_PREV`.
    pub fn move_prev() -> Self {
        Self::new(EventKind::MovePrev)
    }

    /// `SET_ACTIVE_BAR`; `None` lands on the first empty cell.
    pub fn set_active_bar(scope: Scope, bar: impl Into<BarId>, index: Option<usize>) -> Self {
        let mut event = Self::new(EventKind::SetActiveBar);
        event.payload.scope = Some(Value::String(scope.to_string()));
        event.payload.bar_id = Some(Value::String(bar.into().to_string()));
        event.payload.index = index.map(Value::from);
        event
    }

    /// `BACKSPACE`.
    pub fn backspace() -> Self {
        Self::new(EventKind::Backspace)
    }

    /// `RESET`.
    pub fn reset() -> Self {
        Self::new(EventKind::Reset)
    }

    /// `TICK`.
    pub fn tick() -> Self {
        Self::new(EventKind::Tick)
    }

    /// Attaches a client sequence number.
    pub fn with_client_seq(mut self, seq: i64) -> Self {
        self.payload.client_seq = Some(Value::from(seq));
        self
    }

    /// Attaches the state id the client last saw.
    pub fn with_state_id(mut self, state_id: impl ToString) -> Self {
        self.payload.state_id = Some(Value::String(state_id.to_string()));
        self
    }
}
