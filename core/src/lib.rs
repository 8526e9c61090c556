//! Execution tracing and delegation tracking for agent-driven incident
//! investigations.

pub mod agents;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod events_out;
pub mod handler;
pub mod report;
pub mod runner;
pub mod state;
pub mod trace;
pub mod util;
