use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceTag {
    Event,
    Start,
    Agent,
    ToolCall,
    ToolResult,
    A2aTransfer,
    Escalate,
    FinalResponse,
    Reasoning,
    Done,
    State,
    Report,
}

impl TraceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "EVENT",
            Self::Start => "START",
            Self::Agent => "AGENT",
            Self::ToolCall => "TOOL_CALL",
            Self::ToolResult => "TOOL_RESULT",
            Self::A2aTransfer => "A2A_TRANSFER",
            Self::Escalate => "ESCALATE",
            Self::FinalResponse => "FINAL_RESPONSE",
            Self::Reasoning => "REASONING",
            Self::Done => "DONE",
            Self::State => "STATE",
            Self::Report => "REPORT",
        }
    }
}

impl fmt::Display for TraceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for rendered trace lines.
pub trait TraceSink: Send + Sync {
    fn emit(&self, level: Level, tag: TraceTag, message: &str);
}

/// Forwards trace lines to the `tracing` subscriber installed by the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, level: Level, tag: TraceTag, message: &str) {
        let tag = tag.as_str();
        match level {
            Level::ERROR => tracing::error!(target: "aic.trace", tag, "[{tag}] {message}"),
            Level::WARN => tracing::warn!(target: "aic.trace", tag, "[{tag}] {message}"),
            Level::INFO => tracing::info!(target: "aic.trace", tag, "[{tag}] {message}"),
            Level::DEBUG => tracing::debug!(target: "aic.trace", tag, "[{tag}] {message}"),
            Level::TRACE => tracing::trace!(target: "aic.trace", tag, "[{tag}] {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub level: Level,
    pub tag: TraceTag,
    pub message: String,
}

/// Keeps every line in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<TraceLine>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<TraceLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn with_tag(&self, tag: TraceTag) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.tag == tag)
            .map(|l| l.message)
            .collect()
    }

    pub fn count(&self, tag: TraceTag) -> usize {
        self.with_tag(tag).len()
    }

    pub fn tags(&self) -> Vec<TraceTag> {
        self.lines().into_iter().map(|l| l.tag).collect()
    }
}

impl TraceSink for RecordingSink {
    fn emit(&self, level: Level, tag: TraceTag, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(TraceLine {
                level,
                tag,
                message: message.to_string(),
            });
    }
}
