//! Replays a JSON-lines event log through a session.
//!
//! Each non-blank line is one [`EventEnvelope`]. Envelopes are filtered
//! exactly as the HTTP endpoint filters them.

use crate::error::ReplayError;
use crate::session::{ApplyOutcome, EventEnvelope, GameSession};
use serde::Serialize;
use std::io::BufRead;
use tracing::{debug, info, instrument};

/// Counts of envelope outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Reduced into the state.
    pub applied: usize,
    /// Dropped as repeated deliveries.
    pub duplicate: usize,
    /// Dropped as belonging to an older state.
    pub stale: usize,
    /// Dropped for a missing or unknown schema tag.
    pub wrong_schema: usize,
    /// Dropped for a missing or empty event id.
    pub missing_event_id: usize,
}

impl ReplaySummary {
    fn record(&mut self, outcome: ApplyOutcome) {
        match outcome {
            ApplyOutcome::Applied => self.applied += 1,
            ApplyOutcome::Duplicate => self.duplicate += 1,
            ApplyOutcome::Stale => self.stale += 1,
            ApplyOutcome::WrongSchema => self.wrong_schema += 1,
            ApplyOutcome::MissingEventId => self.missing_event_id += 1,
        }
    }
}

/// Applies every envelope in `input` to `session`.
///
/// Stops at the first line that cannot be read or parsed.
#[instrument(skip_all, fields(session_id = %session.id()))]
pub fn replay(
    session: &mut GameSession,
    input: impl BufRead,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();
    for (i, line) in input.lines().enumerate() {
        let number = i + 1;
        let line = line.map_err(|e| ReplayError::new(number, format!("Failed to read: {}", e)))?;
        if line.trim().is_empty() {
            continue;
        }
        let envelope: EventEnvelope = serde_json::from_str(&line)
            .map_err(|e| ReplayError::new(number, format!("Invalid event: {}", e)))?;
        let outcome = session.apply(&envelope);
        debug!(line = number, %outcome, "Replayed event");
        summary.record(outcome);
    }
    info!(?summary, "Replay finished");
    Ok(summary)
}
