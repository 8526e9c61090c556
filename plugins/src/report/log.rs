use aic_core::api::{render_text, ReportDispatcher, RunResult, TraceEmitter};
use async_trait::async_trait;

/// Writes the text report into the trace.
pub struct LogReportDispatcher {
    emitter: TraceEmitter,
}

impl LogReportDispatcher {
    pub fn new(emitter: TraceEmitter) -> Self {
        Self { emitter }
    }
}

#[async_trait]
impl ReportDispatcher for LogReportDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, result: &RunResult) -> anyhow::Result<()> {
        self.emitter.report_body(&render_text(result));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aic_core::api::{RecordingSink, TraceTag};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn report_lines_land_in_the_trace() {
        let sink = RecordingSink::new();
        let dispatcher = LogReportDispatcher::new(TraceEmitter::plain(Arc::new(sink.clone())));
        let result = RunResult {
            response: "Rollback deploy abc".to_string(),
            session_id: "s-1".to_string(),
            elapsed_seconds: 1.5,
            event_count: 3,
            sub_agent_findings: BTreeMap::new(),
        };
        dispatcher.dispatch(&result).await.unwrap();

        let lines = sink.with_tag(TraceTag::Report);
        assert_eq!(lines[0], "[AIC] Incident Investigation Report - Session s-1");
        assert!(lines.iter().any(|l| l == "Rollback deploy abc"));
    }
}
