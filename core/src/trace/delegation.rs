use serde::Serialize;

use crate::event::InvestigationEvent;

/// Active agent changed between two consecutive events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentTransition {
    /// `None` for the very first event of a run.
    pub exited: Option<String>,
    pub entered: String,
}

/// A directed `from -> to` delegation signalled through `transfer_to_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegationEdge {
    pub from: String,
    pub to: String,
}

/// Everything the tracker detected for one event. The three signals are
/// independent and may all be present at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationStep {
    pub transition: Option<AgentTransition>,
    pub transfer: Option<DelegationEdge>,
    /// Author escalating control back to its parent.
    pub escalation: Option<String>,
}

/// Tracks which agent is currently active across an ordered event stream.
#[derive(Debug, Default)]
pub struct DelegationTracker {
    current: Option<String>,
    transitions: usize,
    transfers: Vec<DelegationEdge>,
    escalations: Vec<String>,
}

impl DelegationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called for every event, in stream order.
    pub fn observe(&mut self, ev: &InvestigationEvent) -> DelegationStep {
        let mut step = DelegationStep::default();

        if self.current.as_deref() != Some(ev.author.as_str()) {
            let exited = self.current.replace(ev.author.clone());
            self.transitions += 1;
            step.transition = Some(AgentTransition {
                exited,
                entered: ev.author.clone(),
            });
        }

        if let Some(target) = ev.actions.transfer_to_agent.as_deref() {
            let edge = DelegationEdge {
                from: ev.author.clone(),
                to: target.to_string(),
            };
            self.transfers.push(edge.clone());
            step.transfer = Some(edge);
        }

        if ev.actions.escalate {
            self.escalations.push(ev.author.clone());
            step.escalation = Some(ev.author.clone());
        }

        step
    }

    pub fn current_agent(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions
    }

    pub fn transfers(&self) -> &[DelegationEdge] {
        &self.transfers
    }

    pub fn escalations(&self) -> &[String] {
        &self.escalations
    }
}
