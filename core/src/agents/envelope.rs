use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ENVELOPE_STATUS_SUCCESS: &str = "success";

/// Normalized record of one sub-agent's contribution to an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingEnvelope {
    pub agent_name: String,
    pub incident_id: String,
    pub status: String,
    pub findings: Vec<Value>,
    pub finding_count: usize,
    pub summary: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Stamps the envelope with `started_at` and the current time as its end.
pub fn build_response_envelope(
    agent_name: &str,
    incident_id: &str,
    findings: Vec<Value>,
    started_at: DateTime<Utc>,
    summary: &str,
) -> FindingEnvelope {
    let completed_at = Utc::now().max(started_at);
    let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;

    FindingEnvelope {
        agent_name: agent_name.to_string(),
        incident_id: incident_id.to_string(),
        status: ENVELOPE_STATUS_SUCCESS.to_string(),
        finding_count: findings.len(),
        findings,
        summary: summary.to_string(),
        started_at,
        completed_at,
        duration_ms,
    }
}

impl FindingEnvelope {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_counts_findings() {
        let started = Utc::now();
        let env = build_response_envelope(
            "deploy_agent",
            "INC-7",
            vec![json!({"commit_id": "abc"}), json!({"commit_id": "def"})],
            started,
            "Risky deploy abc",
        );
        assert_eq!(env.finding_count, 2);
        assert_eq!(env.status, "success");
        assert_eq!(env.incident_id, "INC-7");
        assert!(env.completed_at >= env.started_at);

        let value = env.to_value();
        assert_eq!(value["agent_name"], "deploy_agent");
        assert_eq!(value["findings"][1]["commit_id"], "def");
    }
}
