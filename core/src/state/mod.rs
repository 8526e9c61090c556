//! # Session state
//!
//! Investigation sessions, their shared key/value state and the run phase
//! machine. State changes are broadcast as [`StateEvent`]s.

pub mod manager;
mod observe;
pub mod session;
pub mod transitions;
pub mod types;

pub use manager::StateManager;
pub use observe::spawn_state_logger;
pub use session::{SessionState, SessionStatus};
pub use transitions::{PhaseTracker, StateTransition, TransitionError};
pub use types::{RunPhase, StateEvent};
