//! HTTP API.
//!
//! | Method   | Path                     | Body                 | Response              |
//! |----------|--------------------------|----------------------|-----------------------|
//! | `GET`    | `/health`                |                      | `{status}`            |
//! | `GET`    | `/puzzles`               |                      | puzzle summaries      |
//! | `POST`   | `/sessions`              | `{puzzle}`           | `{session_id, props}` |
//! | `GET`    | `/sessions/{id}`         |                      | props                 |
//! | `DELETE` | `/sessions/{id}`         |                      | 204                   |
//! | `POST`   | `/sessions/{id}/events`  | event envelope       | `{outcome, props}`    |
//! | `POST`   | `/sessions/{id}/reset`   |                      | props                 |
//! | `POST`   | `/sessions/{id}/check`   | `{target}`           | props                 |

use crate::error::ApiError;
use crate::session::{ApplyOutcome, EventEnvelope, SessionId, SessionManager};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use septago_core::{Geometry, Props, PuzzleError, PuzzleSummary, list_puzzles, load_puzzle};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, instrument};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live sessions.
    pub sessions: SessionManager,
    /// Where puzzle files are looked up.
    pub puzzle_dir: Arc<PathBuf>,
}

impl AppState {
    /// State with no sessions.
    pub fn new(puzzle_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions: SessionManager::new(),
            puzzle_dir: Arc::new(puzzle_dir.into()),
        }
    }
}

/// Body of `POST /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Puzzle file name inside the puzzle directory.
    pub puzzle: String,
}

/// Response of `POST /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    /// New session id.
    pub session_id: SessionId,
    /// Initial render snapshot.
    pub props: Props,
}

/// Response of `POST /sessions/{id}/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    /// What happened to the envelope.
    pub outcome: ApplyOutcome,
    /// Render snapshot after the event.
    pub props: Props,
}

/// What `POST /sessions/{id}/check` marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckTarget {
    /// The active bar.
    Word,
    /// Every bar.
    Puzzle,
}

/// Body of `POST /sessions/{id}/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// What to check.
    pub target: CheckTarget,
}

/// Builds the application router with request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/puzzles", get(puzzles))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/events", post(post_event))
        .route("/sessions/{id}/reset", post(reset_session))
        .route("/sessions/{id}/check", post(check_session))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip(state))]
async fn puzzles(State(state): State<AppState>) -> Json<Vec<PuzzleSummary>> {
    Json(list_puzzles(state.puzzle_dir.as_path()))
}

/// Rejects names that could escape the puzzle directory.
fn puzzle_file_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Puzzle name must not be empty".to_string()));
    }
    if name.contains(['/', '\\']) || name == ".." || name == "." {
        return Err(ApiError::BadRequest(format!("Invalid puzzle name: {:?}", name)));
    }
    Ok(name)
}

#[instrument(skip(state), fields(puzzle = %request.puzzle))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let name = puzzle_file_name(&request.puzzle)?;
    let path = state.puzzle_dir.join(name);
    if !path.is_file() {
        return Err(ApiError::NotFound(format!("Puzzle not found: {}", name)));
    }
    let puzzle = load_puzzle(&path, Geometry::septago()).map_err(|e| match e {
        PuzzleError::Io { .. } => ApiError::NotFound(e.to_string()),
        other => ApiError::Unprocessable(other.to_string()),
    })?;

    let session_id = state.sessions.create_session(puzzle);
    let props = state.sessions.with_session(&session_id, |s| s.props())?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id, props })))
}

#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Props>, ApiError> {
    Ok(Json(state.sessions.with_session(&id, |s| s.props())?))
}

#[instrument(skip(state))]
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove_session(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, envelope))]
async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(envelope): Json<EventEnvelope>,
) -> Result<Json<EventResponse>, ApiError> {
    let response = state.sessions.with_session(&id, |s| {
        let outcome = s.apply(&envelope);
        EventResponse {
            outcome,
            props: s.props(),
        }
    })?;
    Ok(Json(response))
}

#[instrument(skip(state))]
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Props>, ApiError> {
    let props = state.sessions.with_session(&id, |s| {
        s.reset();
        s.props()
    })?;
    Ok(Json(props))
}

#[instrument(skip(state))]
async fn check_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<Props>, ApiError> {
    let props = state.sessions.with_session(&id, |s| {
        match request.target {
            CheckTarget::Word => s.check_word(),
            CheckTarget::Puzzle => s.check_puzzle(),
        }
        s.props()
    })?;
    Ok(Json(props))
}
