//! Evidence served from a JSON fixture: `{ "<domain>": [items...] }`.

use std::collections::BTreeMap;
use std::path::Path;

use aic_core::api::{Domain, EvidenceSource, TimeWindow};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::time::parse_timestamp;

#[derive(Debug, Clone, Default)]
pub struct FixtureEvidenceSource {
    items: BTreeMap<Domain, Vec<Value>>,
}

impl FixtureEvidenceSource {
    /// No evidence for any domain.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_value(v: &Value) -> anyhow::Result<Self> {
        let obj = v
            .as_object()
            .context("evidence fixture must be a JSON object keyed by domain")?;
        let mut items = BTreeMap::new();
        for (key, list) in obj {
            let domain: Domain = key.parse().map_err(anyhow::Error::msg)?;
            let list = list
                .as_array()
                .with_context(|| format!("evidence for '{key}' must be an array"))?;
            items.insert(domain, list.clone());
        }
        Ok(Self { items })
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read evidence file {}", path.display()))?;
        let v: Value = serde_json::from_str(&s)
            .with_context(|| format!("parse evidence file {}", path.display()))?;
        Self::from_value(&v)
    }
}

fn item_timestamp(item: &Value) -> Option<DateTime<Utc>> {
    item.get("timestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

#[async_trait]
impl EvidenceSource for FixtureEvidenceSource {
    fn name(&self) -> &str {
        "fixture"
    }

    /// Items without a parseable `timestamp` are always returned.
    async fn fetch(
        &self,
        domain: Domain,
        service: &str,
        window: &TimeWindow,
    ) -> anyhow::Result<Vec<Value>> {
        let Some(all) = self.items.get(&domain) else {
            return Ok(Vec::new());
        };
        let found: Vec<Value> = all
            .iter()
            .filter(|item| match item.get("service").and_then(Value::as_str) {
                Some(s) => s == service,
                None => true,
            })
            .filter(|item| item_timestamp(item).map_or(true, |ts| window.contains(ts)))
            .cloned()
            .collect();
        tracing::debug!(
            target: "aic.evidence",
            domain = %domain,
            service,
            total = all.len(),
            found = found.len()
        );
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn filters_by_window_and_service() {
        let source = FixtureEvidenceSource::from_value(&json!({
            "deploy": [
                {"commit_id": "in", "timestamp": "2025-03-01T10:00:00Z"},
                {"commit_id": "late", "timestamp": "2025-03-01T12:00:00Z"},
                {"commit_id": "other", "service": "billing", "timestamp": "2025-03-01T10:00:00Z"},
                {"commit_id": "undated"}
            ]
        }))
        .unwrap();

        let found = source.fetch(Domain::Deploy, "checkout", &window()).await.unwrap();
        let ids: Vec<_> = found.iter().map(|v| v["commit_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["in", "undated"]);

        let none = source.fetch(Domain::Logs, "checkout", &window()).await.unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn rejects_unknown_domains() {
        assert!(FixtureEvidenceSource::from_value(&json!({"traces": []})).is_err());
        assert!(FixtureEvidenceSource::from_value(&json!({"logs": {}})).is_err());
    }
}
