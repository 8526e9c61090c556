use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::state::StateEvent;

use super::types::{EventStream, RunSession};

/// The agent framework an investigation runs against.
///
/// Sessions are scoped by `(app_name, user_id)`. `run_stream` yields events in
/// the order the runtime produced them; an `Err` item ends the run.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    fn name(&self) -> &str;

    /// Name of the orchestrating agent the prompt is addressed to.
    fn root_agent(&self) -> &str;

    async fn create_session(&self, app_name: &str, user_id: &str) -> anyhow::Result<RunSession>;

    async fn run_stream(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        prompt: String,
    ) -> anyhow::Result<EventStream>;

    async fn session_state(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> anyhow::Result<Map<String, Value>>;

    /// Session store notifications, for runtimes that own their store.
    fn state_events(&self) -> Option<broadcast::Receiver<StateEvent>> {
        None
    }
}
