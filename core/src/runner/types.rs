use std::collections::BTreeMap;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::event::InvestigationEvent;

/// Lazy, finite, single-consumer sequence of investigation events.
pub type EventStream = BoxStream<'static, anyhow::Result<InvestigationEvent>>;

/// Handle returned by the runtime when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSession {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
}

/// Terminal artifact of one investigation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub response: String,
    pub session_id: String,
    pub elapsed_seconds: f64,
    pub event_count: u64,
    /// Only keys that were present in session state at drain time.
    pub sub_agent_findings: BTreeMap<String, String>,
}
