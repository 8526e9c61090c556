#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aic_core::api::{
    AgentRuntime, AppConfig, EventStream, InvestigationError, InvestigationEvent,
    ReportDispatcher, RunResult, RunSession, Services, ServicesFactory, TraceEmitter,
};
use async_trait::async_trait;
use futures::stream;
use serde_json::{Map, Value};

pub const SESSION_ID: &str = "session-1";

/// Runtime that replays a fixed list of events and serves a fixed state map.
#[derive(Default)]
pub struct ScriptedRuntime {
    pub events: Vec<Result<InvestigationEvent, String>>,
    pub state: Map<String, Value>,
    pub fail_session: bool,
    pub fail_state: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    pub fn new(events: Vec<InvestigationEvent>) -> Self {
        Self {
            events: events.into_iter().map(Ok).collect(),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state.as_object().cloned().unwrap_or_default();
        self
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    fn root_agent(&self) -> &str {
        "Commander"
    }

    async fn create_session(&self, app_name: &str, user_id: &str) -> anyhow::Result<RunSession> {
        if self.fail_session {
            anyhow::bail!("session service unavailable");
        }
        Ok(RunSession {
            id: SESSION_ID.to_string(),
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
        })
    }

    async fn run_stream(
        &self,
        _app_name: &str,
        _user_id: &str,
        _session_id: &str,
        prompt: String,
    ) -> anyhow::Result<EventStream> {
        self.prompts.lock().unwrap().push(prompt);
        let items: Vec<anyhow::Result<InvestigationEvent>> = self
            .events
            .iter()
            .cloned()
            .map(|r| r.map_err(|e| anyhow::anyhow!(e)))
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }

    async fn session_state(
        &self,
        _app_name: &str,
        _user_id: &str,
        _session_id: &str,
    ) -> anyhow::Result<Map<String, Value>> {
        if self.fail_state {
            anyhow::bail!("state store unavailable");
        }
        Ok(self.state.clone())
    }
}

/// Dispatcher that counts calls and optionally fails every one of them.
#[derive(Default)]
pub struct CountingDispatcher {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl CountingDispatcher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportDispatcher for CountingDispatcher {
    fn name(&self) -> &str {
        "counting"
    }

    async fn dispatch(&self, _result: &RunResult) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("smtp connection refused");
        }
        Ok(())
    }
}

pub struct FixedServices {
    pub runtime: Arc<ScriptedRuntime>,
    pub dispatcher: Arc<CountingDispatcher>,
}

#[async_trait]
impl ServicesFactory for FixedServices {
    async fn build_services(
        &self,
        _cfg: &AppConfig,
        _emitter: &TraceEmitter,
    ) -> Result<Services, InvestigationError> {
        Ok(Services {
            runtime: self.runtime.clone(),
            dispatcher: self.dispatcher.clone(),
        })
    }
}

pub fn args_of(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}
