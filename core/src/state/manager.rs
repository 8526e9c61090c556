//! In-process session store

use super::session::SessionState;
use super::transitions::StateTransition;
use super::types::{RunPhase, StateEvent};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Session store shared between the agent runtime and the sub-agents.
#[derive(Clone)]
pub struct StateManager {
    inner: Arc<StateManagerInner>,
}

struct StateManagerInner {
    sessions: RwLock<HashMap<String, SessionState>>,
    event_tx: broadcast::Sender<StateEvent>,
}

impl StateManager {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(1000);

        let inner = StateManagerInner {
            sessions: RwLock::new(HashMap::new()),
            event_tx,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.inner.event_tx.subscribe()
    }

    fn emit_event(&self, event: StateEvent) {
        let _ = self.inner.event_tx.send(event);
    }

    /// Opens a fresh session with an empty state map.
    pub async fn create_session(&self, app_name: &str, user_id: &str) -> Result<SessionState> {
        let session = SessionState::new(app_name, user_id);
        let session_id = session.session_id.clone();

        {
            let mut sessions = self.inner.sessions.write().await;
            sessions.insert(session_id.clone(), session.clone());
        }

        self.emit_event(StateEvent::SessionCreated {
            session_id,
            app_name: app_name.to_string(),
            timestamp: Utc::now(),
        });

        Ok(session)
    }

    /// Looks a session up by id; app and user must match its owner.
    pub async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<SessionState> {
        let sessions = self.inner.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| s.owned_by(app_name, user_id))
            .cloned()
            .context("Session not found")
    }

    pub async fn state_snapshot(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Map<String, Value>> {
        Ok(self.get_session(app_name, user_id, session_id).await?.state)
    }

    async fn update_session<F>(&self, session_id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut SessionState),
    {
        let mut sessions = self.inner.sessions.write().await;
        let session = sessions.get_mut(session_id).context("Session not found")?;
        f(session);
        Ok(())
    }

    /// Writes one key into the session state. Last write wins.
    pub async fn write_state(&self, session_id: &str, key: &str, value: Value) -> Result<()> {
        self.update_session(session_id, |session| session.write(key, value))
            .await?;

        self.emit_event(StateEvent::StateWritten {
            session_id: session_id.to_string(),
            key: key.to_string(),
            timestamp: Utc::now(),
        });

        Ok(())
    }

    pub async fn apply_state_delta(
        &self,
        session_id: &str,
        delta: &Map<String, Value>,
    ) -> Result<()> {
        if delta.is_empty() {
            return Ok(());
        }
        self.update_session(session_id, |session| session.apply_delta(delta))
            .await?;

        for key in delta.keys() {
            self.emit_event(StateEvent::StateWritten {
                session_id: session_id.to_string(),
                key: key.clone(),
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }

    pub async fn record_events(&self, session_id: &str, count: u64) -> Result<()> {
        self.update_session(session_id, |session| session.increment_events(count))
            .await
    }

    pub async fn transition_session_phase(
        &self,
        session_id: &str,
        new_phase: RunPhase,
    ) -> Result<()> {
        let old_phase = {
            let sessions = self.inner.sessions.read().await;
            sessions
                .get(session_id)
                .map(|s| s.phase)
                .context("Session not found")?
        };

        StateTransition::validate(old_phase, new_phase)?;

        self.update_session(session_id, |session| {
            session.transition_to(new_phase);
        })
        .await?;

        self.emit_event(StateEvent::SessionPhaseChanged {
            session_id: session_id.to_string(),
            old_phase,
            new_phase,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Closes a session whose event stream was exhausted after `events` events.
    pub async fn complete_session(&self, session_id: &str, events: u64) -> Result<()> {
        let (old_phase, event_count, duration_ms) = {
            let mut sessions = self.inner.sessions.write().await;
            let session = sessions.get_mut(session_id).context("Session not found")?;
            let old_phase = session.phase;
            StateTransition::validate(old_phase, RunPhase::Drained)?;
            session.increment_events(events);
            session.complete();
            (old_phase, session.event_count, session.duration_ms())
        };

        self.emit_event(StateEvent::SessionPhaseChanged {
            session_id: session_id.to_string(),
            old_phase,
            new_phase: RunPhase::Drained,
            timestamp: Utc::now(),
        });
        self.emit_event(StateEvent::SessionCompleted {
            session_id: session_id.to_string(),
            event_count,
            duration_ms,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    pub async fn fail_session(&self, session_id: &str, error: String) -> Result<()> {
        self.update_session(session_id, |session| {
            session.transition_to(RunPhase::Aborted);
        })
        .await?;

        self.emit_event(StateEvent::SessionFailed {
            session_id: session_id.to_string(),
            error,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
