use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_INCIDENT: &str = "INC-UNKNOWN";

/// Investigation scope handed to every analysis tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    /// Default correlation anchor.
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            incident_id: None,
        }
    }

    pub fn with_incident(mut self, incident_id: impl Into<String>) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    pub fn incident_id(&self) -> &str {
        self.incident_id.as_deref().unwrap_or(UNKNOWN_INCIDENT)
    }

    /// `anomaly_start` when supplied, else the window end.
    pub fn anchor(&self, anomaly_start: Option<DateTime<Utc>>) -> DateTime<Utc> {
        anomaly_start.unwrap_or(self.end)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}
