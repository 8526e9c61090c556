use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Investigation domains, one sub-agent each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Logs,
    Metrics,
    Deploy,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Logs, Domain::Metrics, Domain::Deploy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Logs => "logs",
            Domain::Metrics => "metrics",
            Domain::Deploy => "deploy",
        }
    }

    pub fn agent_name(&self) -> &'static str {
        match self {
            Domain::Logs => "logs_agent",
            Domain::Metrics => "metrics_agent",
            Domain::Deploy => "deploy_agent",
        }
    }

    /// Session state key the envelope is written under.
    pub fn findings_key(&self) -> &'static str {
        match self {
            Domain::Logs => "logs_findings",
            Domain::Metrics => "metrics_findings",
            Domain::Deploy => "deploy_findings",
        }
    }

    pub fn analyze_tool(&self) -> &'static str {
        match self {
            Domain::Logs => "analyze_logs",
            Domain::Metrics => "analyze_metrics",
            Domain::Deploy => "analyze_deployments",
        }
    }

    pub fn submit_tool(&self) -> &'static str {
        match self {
            Domain::Logs => "submit_logs_response",
            Domain::Metrics => "submit_metrics_response",
            Domain::Deploy => "submit_deploy_response",
        }
    }

    /// Key reporting how many raw evidence items were found.
    pub fn count_key(&self) -> &'static str {
        match self {
            Domain::Logs => "log_events_found",
            Domain::Metrics => "datapoints_found",
            Domain::Deploy => "deployments_found",
        }
    }

    /// Key under which the correlator reports its strongest match.
    pub fn highest_key(&self) -> &'static str {
        match self {
            Domain::Logs => "most_correlated_event",
            Domain::Metrics => "strongest_anomaly",
            Domain::Deploy => "highest_risk_deploy",
        }
    }

    pub fn from_agent_name(name: &str) -> Option<Domain> {
        Domain::ALL.into_iter().find(|d| d.agent_name() == name)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logs" | "log" => Ok(Domain::Logs),
            "metrics" | "metric" => Ok(Domain::Metrics),
            "deploy" | "deploys" | "deployments" => Ok(Domain::Deploy),
            other => Err(format!("unknown domain: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_names_per_domain() {
        assert_eq!(Domain::Deploy.agent_name(), "deploy_agent");
        assert_eq!(Domain::Deploy.findings_key(), "deploy_findings");
        assert_eq!(Domain::Deploy.analyze_tool(), "analyze_deployments");
        assert_eq!(Domain::Deploy.submit_tool(), "submit_deploy_response");
        assert_eq!(Domain::Logs.count_key(), "log_events_found");
        assert_eq!(Domain::Metrics.submit_tool(), "submit_metrics_response");
    }

    #[test]
    fn parse_and_lookup() {
        assert_eq!("Deployments".parse::<Domain>().unwrap(), Domain::Deploy);
        assert!("traces".parse::<Domain>().is_err());
        assert_eq!(Domain::from_agent_name("metrics_agent"), Some(Domain::Metrics));
        assert_eq!(Domain::from_agent_name("Commander"), None);
    }
}
