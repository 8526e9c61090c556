use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Domain, TimeWindow};

/// Fetches raw domain evidence (log events, datapoints, deployments).
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(
        &self,
        domain: Domain,
        service: &str,
        window: &TimeWindow,
    ) -> anyhow::Result<Vec<Value>>;
}

/// Correlates evidence against the incident anchor.
pub trait Correlator: Send + Sync {
    fn name(&self) -> &str;
    fn correlate(
        &self,
        domain: Domain,
        evidence: &[Value],
        anchor: DateTime<Utc>,
    ) -> anyhow::Result<Value>;
}
