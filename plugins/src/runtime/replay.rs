//! Replays a recorded JSONL event stream against an in-memory session store.

use aic_core::api::{
    parse_runtime_line, AgentRuntime, EventStream, InvestigationEvent, RunPhase, RunSession,
    StateEvent, StateManager,
};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use super::{close_stream, open_session};

pub struct ReplayAgentRuntime {
    events_file: String,
    root_agent: String,
    store: StateManager,
}

impl ReplayAgentRuntime {
    pub fn new(events_file: String) -> Self {
        Self {
            events_file,
            root_agent: super::COMMANDER.to_string(),
            store: StateManager::new(),
        }
    }

    pub fn store(&self) -> &StateManager {
        &self.store
    }
}

#[async_trait]
impl AgentRuntime for ReplayAgentRuntime {
    fn name(&self) -> &str {
        "replay"
    }

    fn root_agent(&self) -> &str {
        &self.root_agent
    }

    async fn create_session(&self, app_name: &str, user_id: &str) -> anyhow::Result<RunSession> {
        open_session(&self.store, app_name, user_id).await
    }

    async fn run_stream(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        _prompt: String,
    ) -> anyhow::Result<EventStream> {
        self.store.get_session(app_name, user_id, session_id).await?;
        let content = tokio::fs::read_to_string(&self.events_file)
            .await
            .with_context(|| format!("read events file {}", self.events_file))?;
        self.store
            .transition_session_phase(session_id, RunPhase::Streaming)
            .await?;

        let store = self.store.clone();
        let session_id = session_id.to_string();
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        let stream = async_stream::stream! {
            let mut count: u64 = 0;
            for (idx, line) in lines.iter().enumerate() {
                let parsed = parse_runtime_line(line)
                    .with_context(|| format!("events file line {}", idx + 1));
                let ev: InvestigationEvent = match parsed {
                    Ok(Some(ev)) => ev,
                    Ok(None) => continue,
                    Err(e) => {
                        close_stream(&store, &session_id, count, Some(format!("{e:#}"))).await;
                        let item: anyhow::Result<InvestigationEvent> = Err(e);
                        yield item;
                        return;
                    }
                };
                if let Err(e) = store.apply_state_delta(&session_id, &ev.actions.state_delta).await {
                    close_stream(&store, &session_id, count, Some(format!("{e:#}"))).await;
                    yield Err(e);
                    return;
                }
                count += 1;
                yield Ok(ev);
            }
            close_stream(&store, &session_id, count, None).await;
        };
        Ok(Box::pin(stream))
    }

    async fn session_state(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> anyhow::Result<Map<String, Value>> {
        self.store.state_snapshot(app_name, user_id, session_id).await
    }

    fn state_events(&self) -> Option<broadcast::Receiver<StateEvent>> {
        Some(self.store.subscribe())
    }
}
