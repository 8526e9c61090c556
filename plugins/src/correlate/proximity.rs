//! Time-proximity scoring of evidence against the incident anchor.

use aic_core::api::{Correlator, Domain};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::time::parse_timestamp;

/// Scores each timestamped item by `1 - |distance| / window`. Deployments
/// after the anchor cannot have caused it and score zero.
#[derive(Debug, Clone)]
pub struct ProximityCorrelator {
    window_minutes: i64,
}

impl ProximityCorrelator {
    pub fn new(window_minutes: i64) -> Self {
        Self {
            window_minutes: window_minutes.max(1),
        }
    }

    fn score(&self, domain: Domain, ts: DateTime<Utc>, anchor: DateTime<Utc>) -> f64 {
        let minutes_before = (anchor - ts).num_seconds() as f64 / 60.0;
        if domain == Domain::Deploy && minutes_before < 0.0 {
            return 0.0;
        }
        let score = 1.0 - minutes_before.abs() / self.window_minutes as f64;
        (score.max(0.0) * 100.0).round() / 100.0
    }
}

impl Default for ProximityCorrelator {
    fn default() -> Self {
        Self::new(120)
    }
}

impl Correlator for ProximityCorrelator {
    fn name(&self) -> &str {
        "proximity"
    }

    fn correlate(
        &self,
        domain: Domain,
        evidence: &[Value],
        anchor: DateTime<Utc>,
    ) -> anyhow::Result<Value> {
        let mut scored: Vec<(f64, Value)> = Vec::new();
        for item in evidence {
            let Some(ts) = item
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
            else {
                continue;
            };
            let score = self.score(domain, ts, anchor);
            if score <= 0.0 {
                continue;
            }
            let mut entry = match item {
                Value::Object(obj) => obj.clone(),
                other => {
                    let mut m = Map::new();
                    m.insert("item".to_string(), other.clone());
                    m
                }
            };
            entry.insert("correlation_score".to_string(), json!(score));
            entry.insert(
                "minutes_before_anchor".to_string(),
                json!((anchor - ts).num_minutes()),
            );
            scored.push((score, Value::Object(entry)));
        }
        // stable: equal scores keep evidence order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let correlations: Vec<Value> = scored.into_iter().map(|(_, v)| v).collect();
        let highest = correlations.first().cloned().unwrap_or(Value::Null);

        let mut out = Map::new();
        out.insert("anchor".to_string(), json!(anchor.to_rfc3339()));
        out.insert("correlations".to_string(), Value::Array(correlations));
        out.insert(domain.highest_key().to_string(), highest);
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn closest_prior_deploy_is_highest_risk() {
        let evidence = vec![
            json!({"commit_id": "old", "timestamp": "2025-03-01T08:30:00Z"}),
            json!({"commit_id": "recent", "timestamp": "2025-03-01T09:45:00Z"}),
            json!({"commit_id": "after", "timestamp": "2025-03-01T10:05:00Z"}),
            json!({"commit_id": "undated"}),
        ];
        let out = ProximityCorrelator::new(120)
            .correlate(Domain::Deploy, &evidence, anchor())
            .unwrap();

        assert_eq!(out["highest_risk_deploy"]["commit_id"], "recent");
        assert_eq!(out["highest_risk_deploy"]["correlation_score"], 0.88);
        assert_eq!(out["highest_risk_deploy"]["minutes_before_anchor"], 15);
        assert_eq!(out["correlations"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn later_log_events_still_correlate() {
        let evidence = vec![json!({"message": "timeout", "timestamp": "2025-03-01T10:06:00Z"})];
        let out = ProximityCorrelator::new(60)
            .correlate(Domain::Logs, &evidence, anchor())
            .unwrap();
        assert_eq!(out["most_correlated_event"]["message"], "timeout");
    }

    #[test]
    fn nothing_in_range_yields_null_highest() {
        let out = ProximityCorrelator::new(10)
            .correlate(Domain::Metrics, &[], anchor())
            .unwrap();
        assert!(out["strongest_anomaly"].is_null());
        assert_eq!(out["correlations"], json!([]));
    }
}
