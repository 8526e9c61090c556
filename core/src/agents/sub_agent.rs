//! Domain sub-agent exposing the analyze/submit tool pair.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::{build_response_envelope, Correlator, Domain, EvidenceSource, FindingEnvelope, TimeWindow};
use crate::state::StateManager;
use crate::util::truncate;

const SUMMARY_LOG_MAX: usize = 100;

/// Single-key error shape handed back to the calling agent.
pub fn error_value(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}

pub struct SubAgent {
    domain: Domain,
    source: Arc<dyn EvidenceSource>,
    correlator: Arc<dyn Correlator>,
    store: StateManager,
}

impl SubAgent {
    pub fn new(
        domain: Domain,
        source: Arc<dyn EvidenceSource>,
        correlator: Arc<dyn Correlator>,
        store: StateManager,
    ) -> Self {
        Self {
            domain,
            source,
            correlator,
            store,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn name(&self) -> &'static str {
        self.domain.agent_name()
    }

    pub fn handles(&self, tool: &str) -> bool {
        tool == self.domain.analyze_tool() || tool == self.domain.submit_tool()
    }

    /// Gathers evidence and correlates it against the incident anchor.
    /// Failures come back as `{"error": msg}`, never as `Err`.
    pub async fn analyze(
        &self,
        service: &str,
        window: &TimeWindow,
        anomaly_start: Option<DateTime<Utc>>,
    ) -> Value {
        tracing::info!(
            target: "aic.agent",
            agent = self.name(),
            service,
            start = %window.start,
            end = %window.end,
            "{}", self.domain.analyze_tool()
        );

        let evidence = match self.source.fetch(self.domain, service, window).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(target: "aic.agent", agent = self.name(), error = %e, "evidence fetch failed");
                return error_value(format!("{e:#}"));
            }
        };
        tracing::debug!(target: "aic.agent", agent = self.name(), found = evidence.len());

        let anchor = window.anchor(anomaly_start);
        let correlation = match self.correlator.correlate(self.domain, &evidence, anchor) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "aic.agent", agent = self.name(), error = %e, "correlation failed");
                return error_value(format!("{e:#}"));
            }
        };

        match correlation.get(self.domain.highest_key()) {
            Some(top) if !top.is_null() => {
                tracing::info!(target: "aic.agent", agent = self.name(), top = %top, "strongest correlation")
            }
            _ => tracing::info!(target: "aic.agent", agent = self.name(), "no correlated evidence"),
        }

        let mut out = Map::new();
        out.insert(self.domain.count_key().to_string(), json!(evidence.len()));
        out.insert("correlation_results".to_string(), correlation);
        out.insert("service".to_string(), json!(service));
        out.insert("incident_id".to_string(), json!(window.incident_id()));
        Value::Object(out)
    }

    /// Builds the envelope and writes it under this domain's findings key.
    /// A later submit in the same session replaces the earlier envelope.
    pub async fn submit(
        &self,
        session_id: &str,
        incident_id: &str,
        findings: Vec<Value>,
        summary: &str,
    ) -> anyhow::Result<FindingEnvelope> {
        tracing::info!(
            target: "aic.agent",
            agent = self.name(),
            incident = incident_id,
            findings = findings.len(),
            summary = %truncate(summary, SUMMARY_LOG_MAX),
            "{}", self.domain.submit_tool()
        );

        let started_at = Utc::now();
        let envelope =
            build_response_envelope(self.name(), incident_id, findings, started_at, summary);
        self.store
            .write_state(session_id, self.domain.findings_key(), envelope.to_value())
            .await?;
        Ok(envelope)
    }

    /// Routes a runtime tool call by name.
    pub async fn invoke_tool(&self, session_id: &str, tool: &str, args: &Map<String, Value>) -> Value {
        if tool == self.domain.analyze_tool() {
            match parse_analyze_args(args) {
                Ok((service, window, anomaly_start)) => {
                    self.analyze(&service, &window, anomaly_start).await
                }
                Err(e) => error_value(format!("{e:#}")),
            }
        } else if tool == self.domain.submit_tool() {
            let result = async {
                let (incident_id, findings, summary) = parse_submit_args(args)?;
                self.submit(session_id, &incident_id, findings, &summary).await
            };
            match result.await {
                Ok(envelope) => envelope.to_value(),
                Err(e) => error_value(format!("{e:#}")),
            }
        } else {
            error_value(format!("unknown tool for {}: {tool}", self.name()))
        }
    }
}

fn required_str(args: &Map<String, Value>, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("missing string argument '{key}'"))
}

fn parse_analyze_args(
    args: &Map<String, Value>,
) -> anyhow::Result<(String, TimeWindow, Option<DateTime<Utc>>)> {
    let service = required_str(args, "service")?;
    let window_raw = args
        .get("time_window")
        .cloned()
        .context("missing argument 'time_window'")?;
    let window: TimeWindow =
        serde_json::from_value(window_raw).context("invalid argument 'time_window'")?;
    let anomaly_start = match args.get("anomaly_start") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(
            DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("invalid anomaly_start '{s}'"))?
                .with_timezone(&Utc),
        ),
        Some(other) => anyhow::bail!("invalid anomaly_start {other}"),
    };
    Ok((service, window, anomaly_start))
}

fn parse_submit_args(args: &Map<String, Value>) -> anyhow::Result<(String, Vec<Value>, String)> {
    let incident_id = required_str(args, "incident_id")?;
    let findings = match args.get("findings") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    };
    let summary = args
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok((incident_id, findings, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticSource(Result<Vec<Value>, String>);

    #[async_trait]
    impl EvidenceSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }
        async fn fetch(&self, _: Domain, _: &str, _: &TimeWindow) -> anyhow::Result<Vec<Value>> {
            self.0.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    struct AnchorEcho;

    impl Correlator for AnchorEcho {
        fn name(&self) -> &str {
            "echo"
        }
        fn correlate(&self, domain: Domain, evidence: &[Value], anchor: DateTime<Utc>) -> anyhow::Result<Value> {
            let mut out = Map::new();
            out.insert("anchor".into(), json!(anchor.to_rfc3339()));
            out.insert("correlations".into(), json!(evidence));
            out.insert(domain.highest_key().into(), json!(evidence.first()));
            Ok(Value::Object(out))
        }
    }

    fn agent(source: StaticSource, store: StateManager) -> SubAgent {
        SubAgent::new(Domain::Deploy, Arc::new(source), Arc::new(AnchorEcho), store)
    }

    fn window_args() -> Map<String, Value> {
        json!({
            "service": "checkout",
            "time_window": {"start": "2025-01-01T10:00:00Z", "end": "2025-01-01T11:00:00Z"}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn analyze_reports_count_and_anchor() {
        let store = StateManager::new();
        let agent = agent(StaticSource(Ok(vec![json!({"commit_id": "abc"})])), store);

        let mut args = window_args();
        let out = agent.invoke_tool("s", "analyze_deployments", &args).await;
        assert_eq!(out["deployments_found"], 1);
        assert_eq!(out["service"], "checkout");
        assert_eq!(out["incident_id"], "INC-UNKNOWN");
        assert_eq!(out["correlation_results"]["anchor"], "2025-01-01T11:00:00+00:00");

        args.insert("anomaly_start".into(), json!("2025-01-01T10:30:00Z"));
        let out = agent.invoke_tool("s", "analyze_deployments", &args).await;
        assert_eq!(out["correlation_results"]["anchor"], "2025-01-01T10:30:00+00:00");
    }

    #[tokio::test]
    async fn analyze_failure_is_a_value() {
        let agent = agent(StaticSource(Err("github unavailable".into())), StateManager::new());
        let out = agent.invoke_tool("s", "analyze_deployments", &window_args()).await;
        assert_eq!(out, json!({"error": "github unavailable"}));
    }

    #[tokio::test]
    async fn malformed_args_and_unknown_tools_are_values() {
        let agent = agent(StaticSource(Ok(vec![])), StateManager::new());
        let out = agent.invoke_tool("s", "analyze_deployments", &Map::new()).await;
        assert!(out["error"].as_str().unwrap().contains("service"));

        let out = agent.invoke_tool("s", "analyze_logs", &window_args()).await;
        assert!(out["error"].as_str().unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn submit_writes_envelope_last_write_wins() {
        let store = StateManager::new();
        let session = store.create_session("app", "user").await.unwrap();
        let agent = agent(StaticSource(Ok(vec![])), store.clone());

        let first = json!({"incident_id": "INC-1", "findings": [{"a": 1}], "summary": "first"});
        let second = json!({"incident_id": "INC-1", "findings": [], "summary": "second"});
        agent
            .invoke_tool(&session.session_id, "submit_deploy_response", first.as_object().unwrap())
            .await;
        let out = agent
            .invoke_tool(&session.session_id, "submit_deploy_response", second.as_object().unwrap())
            .await;
        assert_eq!(out["agent_name"], "deploy_agent");

        let state = store
            .state_snapshot("app", "user", &session.session_id)
            .await
            .unwrap();
        assert_eq!(state["deploy_findings"]["summary"], "second");
        assert_eq!(state["deploy_findings"]["finding_count"], 0);
    }

    #[tokio::test]
    async fn submit_to_unknown_session_is_an_error_value() {
        let agent = agent(StaticSource(Ok(vec![])), StateManager::new());
        let args = json!({"incident_id": "INC-1", "findings": [], "summary": "x"});
        let out = agent
            .invoke_tool("missing", "submit_deploy_response", args.as_object().unwrap())
            .await;
        assert!(out.get("error").is_some());
    }
}
