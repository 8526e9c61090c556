//! State type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phases of one investigation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    Init,
    /// Session opened against the agent runtime
    SessionOpen,
    /// Consuming the event stream
    Streaming,
    /// Stream exhausted
    Drained,
    /// Findings read back from session state
    StateRead,
    /// Result handed to the report channel (success)
    Dispatched,
    /// Run-fatal runtime error
    Aborted,
}

/// State change notifications
#[derive(Debug, Clone, Serialize)]
pub enum StateEvent {
    SessionCreated {
        session_id: String,
        app_name: String,
        timestamp: DateTime<Utc>,
    },
    SessionPhaseChanged {
        session_id: String,
        old_phase: RunPhase,
        new_phase: RunPhase,
        timestamp: DateTime<Utc>,
    },
    /// A key in the shared session state was written
    StateWritten {
        session_id: String,
        key: String,
        timestamp: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: String,
        event_count: u64,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    SessionFailed {
        session_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl StateEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionCreated { timestamp, .. }
            | Self::SessionPhaseChanged { timestamp, .. }
            | Self::StateWritten { timestamp, .. }
            | Self::SessionCompleted { timestamp, .. }
            | Self::SessionFailed { timestamp, .. } => *timestamp,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::SessionCreated { session_id, .. }
            | Self::SessionPhaseChanged { session_id, .. }
            | Self::StateWritten { session_id, .. }
            | Self::SessionCompleted { session_id, .. }
            | Self::SessionFailed { session_id, .. } => session_id,
        }
    }
}
