//! Game session management.

use crate::error::SessionError;
use septago_core::{
    EVENT_SCHEMA_VERSION, GameState, Geometry, GridEvent, Marks, Props, Puzzle, check_puzzle,
    check_word, project, reduce,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Transport wrapper around a [`GridEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Must equal [`EVENT_SCHEMA_VERSION`].
    #[serde(default)]
    pub schema_version: Option<String>,
    /// Client-chosen id used to drop repeated deliveries; required.
    #[serde(default)]
    pub event_id: Option<String>,
    /// The event itself.
    #[serde(flatten)]
    pub event: GridEvent,
}

impl EventEnvelope {
    /// Wraps an event with the current schema tag.
    pub fn new(event: GridEvent, event_id: impl Into<Option<String>>) -> Self {
        Self {
            schema_version: Some(EVENT_SCHEMA_VERSION.to_string()),
            event_id: event_id.into(),
            event,
        }
    }
}

/// What [`GameSession::apply`] did with an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Reduced into a new state.
    #[display("applied")]
    Applied,
    /// Same `event_id` as the previous envelope.
    #[display("duplicate")]
    Duplicate,
    /// `payload.state_id` names an older generation.
    #[display("stale")]
    Stale,
    /// Missing or unknown `schema_version`.
    #[display("wrong_schema")]
    WrongSchema,
    /// No `event_id`, or an empty one.
    #[display("missing_event_id")]
    MissingEventId,
}

/// One player's game.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    puzzle: Arc<Puzzle>,
    state: GameState,
    marks: Marks,
    last_event_id: Option<String>,
}

impl GameSession {
    /// Starts a fresh game on `puzzle`.
    #[instrument(skip(puzzle), fields(puzzle_id = %puzzle.puzzle_id()))]
    pub fn new(id: SessionId, puzzle: Puzzle) -> Self {
        info!(session_id = %id, "Creating new game session");
        let state = GameState::init(&puzzle, Geometry::septago());
        Self {
            id,
            puzzle: Arc::new(puzzle),
            state,
            marks: Marks::default(),
            last_event_id: None,
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Puzzle being played.
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Current snapshot.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current correctness marks.
    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    /// Id of the last envelope accepted for processing.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Filters and applies one envelope.
    ///
    /// Edits (`INPUT_LETTER`, `BACKSPACE`, `RESET`) drop existing marks.
    #[instrument(skip(self, envelope), fields(session_id = %self.id, event = %envelope.event.kind))]
    pub fn apply(&mut self, envelope: &EventEnvelope) -> ApplyOutcome {
        if envelope.schema_version.as_deref() != Some(EVENT_SCHEMA_VERSION) {
            warn!(
                schema_version = ?envelope.schema_version,
                "Ignoring envelope with unknown schema"
            );
            return ApplyOutcome::WrongSchema;
        }

        let Some(event_id) = envelope.event_id.as_deref().filter(|id| !id.is_empty()) else {
            warn!("Ignoring envelope without event_id");
            return ApplyOutcome::MissingEventId;
        };
        if self.last_event_id.as_deref() == Some(event_id) {
            debug!(%event_id, "Ignoring duplicate event");
            return ApplyOutcome::Duplicate;
        }
        self.last_event_id = Some(event_id.to_string());

        if let Some(claimed) = envelope.event.payload.state_id()
            && !self.state.state_id().matches(&claimed)
        {
            warn!(%claimed, current = %self.state.state_id(), "Ignoring event from stale state");
            return ApplyOutcome::Stale;
        }

        self.apply_event(&envelope.event);
        ApplyOutcome::Applied
    }

    /// Reduces an event without envelope filtering.
    pub fn apply_event(&mut self, event: &GridEvent) {
        self.state = reduce(&self.state, event, Geometry::septago());
        if event.kind.is_edit() && !self.marks.is_empty() {
            debug!("Edit invalidated correctness marks");
            self.marks = Marks::default();
        }
    }

    /// Starts a new generation: cleared board, no marks, no remembered event id.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset(&mut self) {
        self.apply_event(&GridEvent::reset());
        self.last_event_id = None;
        self.marks = Marks::default();
        info!(state_id = %self.state.state_id(), "Session reset");
    }

    /// Marks the active bar.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn check_word(&mut self) {
        self.marks = check_word(&self.state, Geometry::septago(), &self.puzzle);
    }

    /// Marks the whole puzzle.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn check_puzzle(&mut self) {
        self.marks = check_puzzle(&self.state, Geometry::septago(), &self.puzzle);
    }

    /// Render snapshot.
    pub fn props(&self) -> Props {
        project(&self.state, Geometry::septago(), &self.puzzle, &self.marks)
    }
}

/// Manages all game sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
}

impl SessionManager {
    /// Creates an empty session manager.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, GameSession>> {
        self.sessions.lock().unwrap_or_else(|poisoned| {
            warn!("Session lock was poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    /// Creates a session for `puzzle` under a fresh id.
    #[instrument(skip(self, puzzle), fields(puzzle_id = %puzzle.puzzle_id()))]
    pub fn create_session(&self, puzzle: Puzzle) -> SessionId {
        let id = uuid::Uuid::new_v4().to_string();
        let session = GameSession::new(id.clone(), puzzle);
        self.lock().insert(id.clone(), session);
        info!(session_id = %id, "Created new session");
        id
    }

    /// Snapshot of a session by id.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Option<GameSession> {
        let session = self.lock().get(id).cloned();
        if session.is_none() {
            debug!(session_id = id, "Session not found");
        }
        session
    }

    /// Runs `f` on a session while holding the lock.
    #[instrument(skip(self, f))]
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameSession) -> T,
    ) -> Result<T, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(id).ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            SessionError::not_found(id)
        })?;
        Ok(f(session))
    }

    /// Drops a session.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Result<(), SessionError> {
        match self.lock().remove(id) {
            Some(_) => {
                info!(session_id = id, "Removed session");
                Ok(())
            }
            None => Err(SessionError::not_found(id)),
        }
    }

    /// Ids of all live sessions.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let ids: Vec<_> = self.lock().keys().cloned().collect();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
