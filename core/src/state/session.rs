//! Investigation session state

use super::types::RunPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One investigation session as held by the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Opaque id assigned at creation
    pub session_id: String,
    pub app_name: String,
    pub user_id: String,
    pub status: SessionStatus,
    pub phase: RunPhase,
    /// Shared key/value state written by sub-agents during the run
    pub state: Map<String, Value>,
    pub event_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new(app_name: &str, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            status: SessionStatus::Created,
            phase: RunPhase::Init,
            state: Map::new(),
            event_count: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn owned_by(&self, app_name: &str, user_id: &str) -> bool {
        self.app_name == app_name && self.user_id == user_id
    }

    pub fn transition_to(&mut self, new_phase: RunPhase) {
        self.phase = new_phase;
        self.updated_at = Utc::now();

        self.status = match new_phase {
            RunPhase::Init => SessionStatus::Created,
            RunPhase::SessionOpen
            | RunPhase::Streaming
            | RunPhase::Drained
            | RunPhase::StateRead => SessionStatus::Running,
            RunPhase::Dispatched => SessionStatus::Completed,
            RunPhase::Aborted => SessionStatus::Failed,
        };

        if matches!(
            self.status,
            SessionStatus::Completed | SessionStatus::Failed
        ) {
            self.completed_at = Some(Utc::now());
        }
    }

    /// Last write wins; no merge with a previous value.
    pub fn write(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
        self.updated_at = Utc::now();
    }

    pub fn apply_delta(&mut self, delta: &Map<String, Value>) {
        for (k, v) in delta {
            self.state.insert(k.clone(), v.clone());
        }
        if !delta.is_empty() {
            self.updated_at = Utc::now();
        }
    }

    pub fn increment_events(&mut self, count: u64) {
        self.event_count += count;
        self.updated_at = Utc::now();
    }

    /// Event stream exhausted; the session is done.
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.phase = RunPhase::Drained;
        self.status = SessionStatus::Completed;
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    pub fn duration_ms(&self) -> u64 {
        let end_time = self.completed_at.unwrap_or_else(Utc::now);
        (end_time - self.created_at).num_milliseconds().max(0) as u64
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Created,
    Running,
    Completed,
    Failed,
}
