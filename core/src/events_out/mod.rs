//! JSONL mirror of consumed investigation events.

pub mod helpers;
pub mod writer;

pub use crate::config::EventsOutConfig;
pub use helpers::write_investigation_event;
pub use writer::{start_events_out, EventsOut, EventsOutTx};
