//! Deterministic orchestrator that walks the investigation playbook without a
//! language model: Commander delegates to each configured domain sub-agent,
//! which analyzes, submits its envelope and escalates back.

use std::path::Path;
use std::sync::Arc;

use aic_core::api::{
    extract_alarm, AgentRuntime, Correlator, Domain, EventStream, EvidenceSource,
    InvestigationEvent, PlaybookRuntimeConfig, RunPhase, RunSession, StateEvent, StateManager,
    SubAgent, TimeWindow,
};
use aic_core::util::{compact_json, truncate};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};
use tokio::sync::broadcast;

use super::{close_stream, open_session};
use crate::correlate::ProximityCorrelator;
use crate::evidence::FixtureEvidenceSource;
use crate::time::parse_timestamp;

pub const COMMANDER: &str = "Commander";

const LABEL_MAX: usize = 80;
const LABEL_FIELDS: [&str; 5] = ["commit_id", "message", "metric", "id", "name"];

/// What the alarm says about the incident under investigation.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentScope {
    pub alarm_name: String,
    pub service: String,
    pub anomaly_start: DateTime<Utc>,
    pub incident_id: String,
    pub window: TimeWindow,
}

impl IncidentScope {
    /// Reads a normalized alarm (`{"detail": ..., "detail-type": ...}`).
    /// Missing timestamps fall back to `now`.
    pub fn from_alarm(alarm: &Value, lookback_minutes: i64, now: DateTime<Utc>) -> Self {
        let detail = alarm.get("detail").unwrap_or(alarm);

        let alarm_name = detail
            .get("alarmName")
            .and_then(Value::as_str)
            .unwrap_or("unknown-alarm")
            .to_string();

        let service = detail
            .get("service")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| first_dimension(detail))
            .unwrap_or_else(|| alarm_name.clone());

        let anomaly_start = detail
            .pointer("/state/timestamp")
            .or_else(|| alarm.get("time"))
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or(now);

        let incident_id = format!("INC-{}", anomaly_start.format("%Y%m%d-%H%M%S"));
        let lookback = Duration::minutes(lookback_minutes.max(1));
        let window = TimeWindow::new(anomaly_start - lookback, anomaly_start + lookback)
            .with_incident(incident_id.clone());

        Self {
            alarm_name,
            service,
            anomaly_start,
            incident_id,
            window,
        }
    }
}

/// First metric dimension value in a CloudWatch alarm configuration.
fn first_dimension(detail: &Value) -> Option<String> {
    detail
        .pointer("/configuration/metrics")?
        .as_array()?
        .iter()
        .filter_map(|m| m.pointer("/metricStat/metric/dimensions")?.as_object())
        .flat_map(|dims| dims.values())
        .find_map(|v| v.as_str().map(str::to_string))
}

fn evidence_noun(domain: Domain) -> &'static str {
    match domain {
        Domain::Logs => "log events",
        Domain::Metrics => "metric datapoints",
        Domain::Deploy => "deployments",
    }
}

fn label_of(item: &Value) -> String {
    LABEL_FIELDS
        .iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| truncate(&compact_json(item), LABEL_MAX))
}

/// Findings list and one-line summary for an analysis result.
fn summarize(domain: Domain, service: &str, analysis: &Value) -> (Vec<Value>, String) {
    if let Some(err) = analysis.get("error") {
        return (
            Vec::new(),
            format!(
                "{} could not complete analysis: {}",
                domain.agent_name(),
                compact_json(err)
            ),
        );
    }

    let count = analysis
        .get(domain.count_key())
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let results = analysis.get("correlation_results");
    let findings = results
        .and_then(|r| r.get("correlations"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let summary = match results
        .and_then(|r| r.get(domain.highest_key()))
        .filter(|v| !v.is_null())
    {
        Some(top) => format!(
            "{count} {} reviewed for {service}; strongest signal {} (score {}).",
            evidence_noun(domain),
            label_of(top),
            top.get("correlation_score")
                .map(compact_json)
                .unwrap_or_else(|| "n/a".to_string())
        ),
        None => format!(
            "{count} {} reviewed for {service}; none correlated with the incident window.",
            evidence_noun(domain)
        ),
    };
    (findings, summary)
}

fn object(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

pub struct PlaybookAgentRuntime {
    lookback_minutes: i64,
    store: StateManager,
    agents: Vec<Arc<SubAgent>>,
}

impl PlaybookAgentRuntime {
    pub fn new(cfg: &PlaybookRuntimeConfig) -> anyhow::Result<Self> {
        let source = match cfg.evidence_file.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => FixtureEvidenceSource::from_file(Path::new(path))?,
            None => FixtureEvidenceSource::empty(),
        };
        let domains = cfg
            .domains
            .iter()
            .map(|d| d.parse::<Domain>().map_err(anyhow::Error::msg))
            .collect::<anyhow::Result<Vec<_>>>()
            .context("runtime.domains")?;
        Ok(Self::with_parts(
            cfg.lookback_minutes,
            &domains,
            Arc::new(source),
            Arc::new(ProximityCorrelator::new(cfg.correlation_window_minutes)),
        ))
    }

    pub fn with_parts(
        lookback_minutes: i64,
        domains: &[Domain],
        source: Arc<dyn EvidenceSource>,
        correlator: Arc<dyn Correlator>,
    ) -> Self {
        let store = StateManager::new();
        let agents = domains
            .iter()
            .map(|d| {
                Arc::new(SubAgent::new(
                    *d,
                    source.clone(),
                    correlator.clone(),
                    store.clone(),
                ))
            })
            .collect();
        Self {
            lookback_minutes,
            store,
            agents,
        }
    }

    pub fn store(&self) -> &StateManager {
        &self.store
    }
}

#[async_trait]
impl AgentRuntime for PlaybookAgentRuntime {
    fn name(&self) -> &str {
        "playbook"
    }

    fn root_agent(&self) -> &str {
        COMMANDER
    }

    async fn create_session(&self, app_name: &str, user_id: &str) -> anyhow::Result<RunSession> {
        open_session(&self.store, app_name, user_id).await
    }

    async fn run_stream(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        prompt: String,
    ) -> anyhow::Result<EventStream> {
        self.store.get_session(app_name, user_id, session_id).await?;
        let alarm = extract_alarm(&prompt).context("prompt carries no alarm payload")?;
        let scope = IncidentScope::from_alarm(&alarm, self.lookback_minutes, Utc::now());
        tracing::info!(
            target: "aic.runtime",
            session_id,
            incident = %scope.incident_id,
            service = %scope.service,
            agents = self.agents.len(),
            "playbook run"
        );
        self.store
            .transition_session_phase(session_id, RunPhase::Streaming)
            .await?;

        let store = self.store.clone();
        let agents = self.agents.clone();
        let session_id = session_id.to_string();

        let stream = async_stream::stream! {
            let mut count: u64 = 0;
            let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
            let plan = InvestigationEvent::new(COMMANDER).with_text(format!(
                "DETECT: alarm {} on {} at {}. PLAN: delegate to {}.",
                scope.alarm_name,
                scope.service,
                scope.anomaly_start.to_rfc3339(),
                if names.is_empty() { "no sub-agents".to_string() } else { names.join(", ") },
            ));
            count += 1;
            let item: anyhow::Result<InvestigationEvent> = Ok(plan);
            yield item;

            let mut summaries = Vec::with_capacity(agents.len());
            for agent in &agents {
                let domain = agent.domain();
                let name = agent.name();

                count += 1;
                yield Ok(InvestigationEvent::new(COMMANDER).with_transfer(name));

                let analyze_args = object(json!({
                    "service": scope.service,
                    "time_window": scope.window,
                    "anomaly_start": scope.anomaly_start.to_rfc3339(),
                }));
                count += 1;
                yield Ok(InvestigationEvent::new(name).with_call(domain.analyze_tool(), analyze_args.clone()));

                let analysis = agent.invoke_tool(&session_id, domain.analyze_tool(), &analyze_args).await;
                count += 1;
                yield Ok(InvestigationEvent::new(name).with_response(domain.analyze_tool(), analysis.clone()));

                let (findings, summary) = summarize(domain, &scope.service, &analysis);
                count += 1;
                yield Ok(InvestigationEvent::new(name).with_text(summary.clone()));

                let submit_args = object(json!({
                    "incident_id": scope.incident_id,
                    "findings": findings,
                    "summary": summary,
                }));
                count += 1;
                yield Ok(InvestigationEvent::new(name).with_call(domain.submit_tool(), submit_args.clone()));

                let envelope = agent.invoke_tool(&session_id, domain.submit_tool(), &submit_args).await;
                let mut response = InvestigationEvent::new(name).with_response(domain.submit_tool(), envelope.clone());
                // Mirror the tool's state write so recorded runs replay with findings.
                if envelope.get("error").is_none() {
                    response = response.with_state(domain.findings_key(), envelope);
                }
                count += 1;
                yield Ok(response);

                count += 1;
                yield Ok(InvestigationEvent::new(name).with_escalation());

                summaries.push(summary);
            }

            let body = if summaries.is_empty() {
                "no domains configured.".to_string()
            } else {
                summaries.join(" ")
            };
            count += 1;
            yield Ok(InvestigationEvent::new(COMMANDER)
                .with_text(format!(
                    "Incident {} ({} on {}): {}",
                    scope.incident_id, scope.alarm_name, scope.service, body
                ))
                .final_response());

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
