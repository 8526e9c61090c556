mod prompt;
mod run;
mod traits;
pub mod types;

pub use prompt::{build_prompt, extract_alarm};
pub use run::{collect_findings, run_investigation, InvestigationArgs};
pub use traits::AgentRuntime;
pub use types::{EventStream, RunResult, RunSession};
