//! Execution tracing for an investigation run: who is active, what was called,
//! what came back, and which text ends up in the final answer.

mod delegation;
mod emitter;
mod palette;
mod sink;

pub use delegation::{AgentTransition, DelegationEdge, DelegationStep, DelegationTracker};
pub use emitter::{EventText, TextKind, TraceEmitter, TraceLimits};
pub use palette::{Style, TracePalette};
pub use sink::{RecordingSink, TraceLine, TraceSink, TraceTag, TracingSink};
