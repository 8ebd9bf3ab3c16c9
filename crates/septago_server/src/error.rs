//! Error types for the server crate.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use serde_json::json;
use tracing::warn;

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a configuration error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// What went wrong with a session lookup.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionErrorKind {
    /// No session with this id.
    #[display("Session not found: {}", _0)]
    NotFound(String),
}

/// Session error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", kind, file, line)]
pub struct SessionError {
    /// Error kind.
    pub kind: SessionErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a session error at the caller's location.
    #[track_caller]
    pub fn new(kind: SessionErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Unknown session id.
    #[track_caller]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::NotFound(id.into()))
    }
}

/// Failure while replaying an event log.
#[derive(Debug, Clone, Display, Error)]
#[display("Replay error on input line {}: {} at {}:{}", input_line, message, file, line)]
pub struct ReplayError {
    /// Error message.
    pub message: String,
    /// 1-based line of the event log.
    pub input_line: usize,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ReplayError {
    /// Creates a replay error at the caller's location.
    #[track_caller]
    pub fn new(input_line: usize, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            input_line,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// HTTP-facing error; rendered as `{"error": "..."}` with a matching status.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ApiError {
    /// Malformed request.
    #[display("{}", _0)]
    BadRequest(String),
    /// Unknown puzzle or session.
    #[display("{}", _0)]
    NotFound(String),
    /// Puzzle file failed validation.
    #[display("{}", _0)]
    Unprocessable(String),
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err.kind {
            SessionErrorKind::NotFound(_) => ApiError::NotFound(err.kind.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = %status, error = %self, "Request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_records_location() {
        let err = ConfigError::new("bad port");
        assert_eq!(err.file, file!());
        assert!(err.to_string().starts_with("Config error: bad port at "));
    }

    #[test]
    fn test_session_error_maps_to_not_found() {
        let api: ApiError = SessionError::not_found("abc").into();
        assert_eq!(api, ApiError::NotFound("Session not found: abc".to_string()));
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unprocessable(String::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
