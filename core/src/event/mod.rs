mod model;
mod parser;

pub use model::{EventActions, FunctionCall, FunctionResponse, InvestigationEvent};
pub use parser::{parse_runtime_event, parse_runtime_line, UNKNOWN_AUTHOR};
