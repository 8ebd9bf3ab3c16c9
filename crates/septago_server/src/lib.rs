//! Septago server - sessions, HTTP API and tooling around `septago_core`.
//!
//! # Architecture
//!
//! - **Config**: TOML file, `.env`/environment overrides, CLI overrides
//! - **Session**: one [`GameSession`] per player, held by a [`SessionManager`]
//! - **Server**: axum routes translating JSON requests into session calls
//! - **Replay**: drives a session from a JSON-lines event log
//!
//! Every reduction happens inside the session manager's lock, so events for
//! a session are applied one at a time even under the async server.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod logging;
mod replay;
mod server;
mod session;

pub use config::{DEFAULT_CONFIG_FILE, ServerConfig};
pub use error::{ApiError, ConfigError, ReplayError, SessionError, SessionErrorKind};
pub use replay::{ReplaySummary, replay};
pub use server::{
    AppState, CheckRequest, CheckTarget, CreateSessionRequest, EventResponse, SessionCreated,
    router,
};
pub use session::{ApplyOutcome, EventEnvelope, GameSession, SessionId, SessionManager};
