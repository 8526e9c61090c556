use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::Level;

use crate::config::TraceConfig;
use crate::event::{FunctionCall, FunctionResponse, InvestigationEvent};
use crate::util::{compact_json, is_blank, truncate};

use super::delegation::{DelegationStep, DelegationTracker};
use super::palette::TracePalette;
use super::sink::{TraceSink, TraceTag};

/// Display bounds, in characters, for the different kinds of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLimits {
    pub tool_args_max: usize,
    pub tool_result_max: usize,
    pub reasoning_max: usize,
    pub final_max: usize,
    pub state_preview_max: usize,
    pub event_preview_max: usize,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self {
            tool_args_max: 200,
            tool_result_max: 300,
            reasoning_max: 300,
            final_max: 500,
            state_preview_max: 200,
            event_preview_max: 500,
        }
    }
}

impl From<&TraceConfig> for TraceLimits {
    fn from(cfg: &TraceConfig) -> Self {
        Self {
            tool_args_max: cfg.tool_args_max,
            tool_result_max: cfg.tool_result_max,
            reasoning_max: cfg.reasoning_max,
            final_max: cfg.final_max,
            state_preview_max: cfg.state_preview_max,
            event_preview_max: cfg.event_preview_max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Final,
    Reasoning,
}

/// The narrative text of one event, as classified by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventText {
    pub kind: TextKind,
    pub text: String,
}

/// Renders investigation events into trace lines on a [`TraceSink`].
#[derive(Clone)]
pub struct TraceEmitter {
    sink: Arc<dyn TraceSink>,
    palette: TracePalette,
    limits: TraceLimits,
}

impl TraceEmitter {
    pub fn new(sink: Arc<dyn TraceSink>, palette: TracePalette, limits: TraceLimits) -> Self {
        Self {
            sink,
            palette,
            limits,
        }
    }

    pub fn plain(sink: Arc<dyn TraceSink>) -> Self {
        Self::new(sink, TracePalette::plain(), TraceLimits::default())
    }

    pub fn limits(&self) -> &TraceLimits {
        &self.limits
    }

    fn line(&self, level: Level, tag: TraceTag, message: &str) {
        self.sink.emit(level, tag, &self.palette.paint(tag, message));
    }

    /// Emits every line for one event in fixed order: transition, tool calls,
    /// tool results, delegation, escalation, text. Returns the classified text,
    /// if the event produced a text line.
    pub fn emit_event(&self, step: &DelegationStep, ev: &InvestigationEvent) -> Option<EventText> {
        if let Some(t) = &step.transition {
            if let Some(prev) = &t.exited {
                self.line(Level::INFO, TraceTag::Agent, &format!("<<< Exiting: {prev}"));
            }
            self.line(
                Level::INFO,
                TraceTag::Agent,
                &format!(">>> Entering: {}", self.palette.emphasis(&t.entered)),
            );
        }

        for call in &ev.function_calls {
            self.line(Level::INFO, TraceTag::ToolCall, &self.render_call(call));
        }

        for resp in &ev.function_responses {
            self.line(Level::INFO, TraceTag::ToolResult, &self.render_response(resp));
        }

        if let Some(edge) = &step.transfer {
            self.line(
                Level::INFO,
                TraceTag::A2aTransfer,
                &format!("{} → {}", edge.from, edge.to),
            );
        }

        if let Some(author) = &step.escalation {
            self.line(
                Level::INFO,
                TraceTag::Escalate,
                &format!("{author} escalating to parent"),
            );
        }

        let text = ev.combined_text()?;
        if ev.is_final_response {
            self.line(
                Level::INFO,
                TraceTag::FinalResponse,
                &format!(
                    "{} {}",
                    self.palette.emphasis(&format!("[{}]", ev.author)),
                    truncate(&text, self.limits.final_max)
                ),
            );
            Some(EventText {
                kind: TextKind::Final,
                text,
            })
        } else if !ev.has_tool_activity() {
            self.line(
                Level::INFO,
                TraceTag::Reasoning,
                &format!("[{}] {}", ev.author, truncate(&text, self.limits.reasoning_max)),
            );
            Some(EventText {
                kind: TextKind::Reasoning,
                text,
            })
        } else {
            None
        }
    }

    /// `name({"arg":"value",...})` with every argument value truncated on its own.
    pub fn render_call(&self, call: &FunctionCall) -> String {
        let args: Map<String, Value> = call
            .args
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    Value::String(truncate(&compact_json(v), self.limits.tool_args_max)),
                )
            })
            .collect();
        let args = serde_json::to_string(&args).unwrap_or_else(|_| "{}".to_string());
        format!("{}({args})", call.name)
    }

    pub fn render_response(&self, resp: &FunctionResponse) -> String {
        let payload = if is_blank(&resp.response) {
            String::new()
        } else {
            serde_json::to_string(&resp.response).unwrap_or_default()
        };
        format!(
            "{} → {}",
            resp.name,
            truncate(&payload, self.limits.tool_result_max)
        )
    }

    pub fn received(&self, raw: &Value) {
        let preview = serde_json::to_string(raw).unwrap_or_default();
        self.line(
            Level::INFO,
            TraceTag::Event,
            &format!(
                "Received event: {}",
                truncate(&preview, self.limits.event_preview_max)
            ),
        );
    }

    pub fn start(&self, session_id: &str, root_agent: &str) {
        self.line(
            Level::INFO,
            TraceTag::Start,
            &format!("Session {session_id} | Invoking {root_agent} agent"),
        );
    }

    pub fn done(
        &self,
        elapsed_seconds: f64,
        event_count: u64,
        session_id: &str,
        tracker: &DelegationTracker,
    ) {
        self.line(
            Level::INFO,
            TraceTag::Done,
            &format!(
                "Completed in {elapsed_seconds:.1}s | {event_count} events | {} transfers | {} escalations | session={session_id}",
                tracker.transfers().len(),
                tracker.escalations().len(),
            ),
        );
    }

    /// One line per well-known finding key, set or not.
    pub fn state_entry(&self, key: &str, rendered: Option<&str>) {
        let msg = match rendered {
            Some(v) => format!("{key} = {}", truncate(v, self.limits.state_preview_max)),
            None => format!("{key} = (not set)"),
        };
        self.line(Level::INFO, TraceTag::State, &msg);
    }

    pub fn report_sent(&self, channel: &str) {
        self.line(
            Level::INFO,
            TraceTag::Report,
            &format!("Findings report sent via {channel}"),
        );
    }

    pub fn report_failed(&self, channel: &str, err: &anyhow::Error) {
        let msg = format!("Failed to send report via {channel}: {err:#}");
        self.sink
            .emit(Level::WARN, TraceTag::Report, &self.palette.red(&msg));
    }

    pub fn report_body(&self, body: &str) {
        for line in body.lines() {
            self.line(Level::INFO, TraceTag::Report, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::RecordingSink;
    use serde_json::json;

    fn emitter() -> (TraceEmitter, RecordingSink) {
        let sink = RecordingSink::new();
        (TraceEmitter::plain(Arc::new(sink.clone())), sink)
    }

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_line_order_within_one_event() {
        let (emitter, sink) = emitter();
        let mut tracker = DelegationTracker::new();
        tracker.observe(&InvestigationEvent::new("Commander"));

        let ev = InvestigationEvent::new("logs_agent")
            .with_call("analyze_logs", args(json!({"service": "api"})))
            .with_response("transfer_to_agent", json!({"ok": true}))
            .with_transfer("metrics_agent")
            .with_escalation();
        let step = tracker.observe(&ev);
        let text = emitter.emit_event(&step, &ev);

        assert!(text.is_none());
        assert_eq!(
            sink.tags(),
            vec![
                TraceTag::Agent,
                TraceTag::Agent,
                TraceTag::ToolCall,
                TraceTag::ToolResult,
                TraceTag::A2aTransfer,
                TraceTag::Escalate,
            ]
        );
        let agent = sink.with_tag(TraceTag::Agent);
        assert_eq!(agent[0], "<<< Exiting: Commander");
        assert_eq!(agent[1], ">>> Entering: logs_agent");
    }

    #[test]
    fn test_tool_args_truncated_per_value_and_stay_valid_json() {
        let (emitter, _sink) = emitter();
        let call = FunctionCall {
            name: "analyze_deployments".into(),
            args: args(json!({
                "service": "x".repeat(500),
                "time_window": {"start": "2024-01-01T00:00:00Z", "end": "2024-01-01T01:00:00Z"},
                "quote": "say \"hi\""
            })),
        };
        let line = emitter.render_call(&call);
        let inner = line
            .strip_prefix("analyze_deployments(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap();
        let parsed: Value = serde_json::from_str(inner).unwrap();
        let service = parsed["service"].as_str().unwrap();
        assert_eq!(service.chars().count(), 203);
        assert!(service.ends_with("..."));
        assert_eq!(parsed["quote"], "say \"hi\"");
        assert!(parsed["time_window"].as_str().unwrap().contains("2024-01-01T01:00:00Z"));
    }

    #[test]
    fn test_tool_result_uses_larger_bound_and_blank_payload() {
        let (emitter, _sink) = emitter();
        let big = FunctionResponse {
            name: "analyze_logs".into(),
            response: json!({"blob": "y".repeat(1000)}),
        };
        let line = emitter.render_response(&big);
        let payload = line.strip_prefix("analyze_logs → ").unwrap();
        assert_eq!(payload.chars().count(), 303);

        let empty = FunctionResponse {
            name: "noop".into(),
            response: Value::Null,
        };
        assert_eq!(emitter.render_response(&empty), "noop → ");
    }

    #[test]
    fn test_text_classification() {
        let (emitter, sink) = emitter();
        let step = DelegationStep::default();

        let reasoning = InvestigationEvent::new("Commander").with_text("thinking");
        let got = emitter.emit_event(&step, &reasoning).unwrap();
        assert_eq!(got.kind, TextKind::Reasoning);

        let fin = InvestigationEvent::new("Commander")
            .with_text("all done")
            .final_response();
        let got = emitter.emit_event(&step, &fin).unwrap();
        assert_eq!(got.kind, TextKind::Final);
        assert_eq!(got.text, "all done");

        let narrated_call = InvestigationEvent::new("Commander")
            .with_text("calling a tool")
            .with_call("analyze_logs", Map::new());
        assert!(emitter.emit_event(&step, &narrated_call).is_none());

        assert_eq!(sink.with_tag(TraceTag::Reasoning), vec!["[Commander] thinking"]);
        assert_eq!(sink.with_tag(TraceTag::FinalResponse), vec!["[Commander] all done"]);
    }

    #[test]
    fn test_final_display_truncated_but_text_returned_whole() {
        let (emitter, sink) = emitter();
        let long = "z".repeat(800);
        let ev = InvestigationEvent::new("Commander")
            .with_text(long.clone())
            .final_response();
        let got = emitter.emit_event(&DelegationStep::default(), &ev).unwrap();
        assert_eq!(got.text, long);
        let shown = &sink.with_tag(TraceTag::FinalResponse)[0];
        assert_eq!(shown.chars().count(), "[Commander] ".len() + 503);
    }

    #[test]
    fn test_state_entries() {
        let (emitter, sink) = emitter();
        emitter.state_entry("logs_findings", None);
        emitter.state_entry("deploy_findings", Some("abc"));
        assert_eq!(
            sink.with_tag(TraceTag::State),
            vec!["logs_findings = (not set)", "deploy_findings = abc"]
        );
    }
}
