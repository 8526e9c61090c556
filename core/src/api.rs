//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `aic_core::api` instead of reaching into internal modules.

pub use crate::agents::{
    build_response_envelope, error_value, Correlator, Domain, EvidenceSource, FindingEnvelope,
    SubAgent, TimeWindow, UNKNOWN_INCIDENT,
};
pub use crate::config::{
    load_default, load_from_path, AppConfig, ColorMode, EventsOutConfig, FindingsConfig,
    LoggingConfig, PlaybookRuntimeConfig, ReplayRuntimeConfig, ReportConfig, RuntimeConfig,
    TraceConfig, WebhookReportConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::error::{CliError, InvestigationError};
pub use crate::event::{
    parse_runtime_event, parse_runtime_line, EventActions, FunctionCall, FunctionResponse,
    InvestigationEvent,
};
pub use crate::events_out::{start_events_out, EventsOut, EventsOutTx};
pub use crate::handler::{
    handle_event, handle_event_blocking, investigate, normalize_alarm_event, HandlerResponse,
    ALARM_DETAIL_TYPE,
};
pub use crate::report::{
    dispatch_report, render_html, render_text, subject, ReportDispatcher,
};
pub use crate::runner::{
    build_prompt, extract_alarm, run_investigation, AgentRuntime, EventStream,
    InvestigationArgs, RunResult, RunSession,
};
pub use crate::state::{
    spawn_state_logger, RunPhase, SessionState, SessionStatus, StateEvent, StateManager,
};
pub use crate::trace::{
    RecordingSink, TraceEmitter, TraceLimits, TracePalette, TraceSink, TraceTag, TracingSink,
};
