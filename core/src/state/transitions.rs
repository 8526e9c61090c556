//! Run phase transition rules

use super::types::RunPhase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: RunPhase, to: RunPhase },
    #[error("Cannot transition from terminal state {state:?}")]
    FromTerminalState { state: RunPhase },
}

pub struct StateTransition;

impl StateTransition {
    pub fn validate(from: RunPhase, to: RunPhase) -> Result<(), TransitionError> {
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        let is_valid = match (from, to) {
            (RunPhase::Init, RunPhase::SessionOpen) => true,
            (RunPhase::SessionOpen, RunPhase::Streaming) => true,
            (RunPhase::Streaming, RunPhase::Drained) => true,
            (RunPhase::Drained, RunPhase::StateRead) => true,
            (RunPhase::StateRead, RunPhase::Dispatched) => true,

            // Runtime failures abort from any live phase. Once findings have
            // been read the run can no longer be aborted (dispatch errors are
            // not fatal).
            (RunPhase::StateRead, RunPhase::Aborted) => false,
            (_, RunPhase::Aborted) => true,

            _ => false,
        };

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    pub fn is_terminal(phase: RunPhase) -> bool {
        matches!(phase, RunPhase::Dispatched | RunPhase::Aborted)
    }

    pub fn phase_description(phase: RunPhase) -> &'static str {
        match phase {
            RunPhase::Init => "initialising",
            RunPhase::SessionOpen => "session open",
            RunPhase::Streaming => "consuming event stream",
            RunPhase::Drained => "event stream drained",
            RunPhase::StateRead => "findings read back",
            RunPhase::Dispatched => "report dispatched",
            RunPhase::Aborted => "aborted",
        }
    }
}

/// Tracks the current phase of one run and enforces the transition rules.
#[derive(Debug)]
pub struct PhaseTracker {
    phase: RunPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Init,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn advance(&mut self, to: RunPhase) -> Result<RunPhase, TransitionError> {
        StateTransition::validate(self.phase, to)?;
        let from = std::mem::replace(&mut self.phase, to);
        tracing::debug!(
            from = StateTransition::phase_description(from),
            to = StateTransition::phase_description(to),
            "run phase changed"
        );
        Ok(from)
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
