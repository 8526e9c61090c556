use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identity under which sessions are opened.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// System user identity under which sessions are opened.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub trace: TraceConfig,

    #[serde(default)]
    pub findings: FindingsConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub events_out: EventsOutConfig,
}

fn default_app_name() -> String {
    "aic-commander".to_string()
}

fn default_user_id() -> String {
    "system".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            user_id: default_user_id(),
            logging: LoggingConfig::default(),
            trace: TraceConfig::default(),
            findings: FindingsConfig::default(),
            runtime: RuntimeConfig::default(),
            report: ReportConfig::default(),
            events_out: EventsOutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "aic_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colour only when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn resolve(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub color: ColorMode,

    #[serde(default = "default_tool_args_max")]
    pub tool_args_max: usize,

    #[serde(default = "default_tool_result_max")]
    pub tool_result_max: usize,

    #[serde(default = "default_reasoning_max")]
    pub reasoning_max: usize,

    #[serde(default = "default_final_max")]
    pub final_max: usize,

    #[serde(default = "default_state_preview_max")]
    pub state_preview_max: usize,

    #[serde(default = "default_event_preview_max")]
    pub event_preview_max: usize,
}

fn default_tool_args_max() -> usize {
    200
}

fn default_tool_result_max() -> usize {
    300
}

fn default_reasoning_max() -> usize {
    300
}

fn default_final_max() -> usize {
    500
}

fn default_state_preview_max() -> usize {
    200
}

fn default_event_preview_max() -> usize {
    500
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            tool_args_max: default_tool_args_max(),
            tool_result_max: default_tool_result_max(),
            reasoning_max: default_reasoning_max(),
            final_max: default_final_max(),
            state_preview_max: default_state_preview_max(),
            event_preview_max: default_event_preview_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingsConfig {
    /// Session state keys read back after the stream drains, in this order.
    #[serde(default = "default_findings_keys")]
    pub keys: Vec<String>,

    /// Bound applied to each rendered value in the result bundle.
    #[serde(default = "default_findings_value_max")]
    pub value_max: usize,
}

fn default_findings_keys() -> Vec<String> {
    vec![
        "logs_findings".to_string(),
        "metrics_findings".to_string(),
        "deploy_findings".to_string(),
    ]
}

fn default_findings_value_max() -> usize {
    500
}

impl Default for FindingsConfig {
    fn default() -> Self {
        Self {
            keys: default_findings_keys(),
            value_max: default_findings_value_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum RuntimeConfig {
    #[serde(rename = "playbook")]
    Playbook(PlaybookRuntimeConfig),
    #[serde(rename = "replay")]
    Replay(ReplayRuntimeConfig),
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig::Playbook(PlaybookRuntimeConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReplayRuntimeConfig {
    pub events_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookRuntimeConfig {
    /// JSON file with per-domain evidence; no file means no evidence.
    #[serde(default)]
    pub evidence_file: Option<String>,

    /// Width of the investigation window ending at the anomaly start.
    #[serde(default = "default_lookback_minutes")]
    pub lookback_minutes: i64,

    /// Evidence further than this from the anchor scores zero.
    #[serde(default = "default_correlation_window_minutes")]
    pub correlation_window_minutes: i64,

    /// Domains delegated to, in order: "logs", "metrics", "deploy".
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
}

fn default_lookback_minutes() -> i64 {
    60
}

fn default_correlation_window_minutes() -> i64 {
    120
}

fn default_domains() -> Vec<String> {
    vec!["logs".to_string(), "metrics".to_string(), "deploy".to_string()]
}

impl Default for PlaybookRuntimeConfig {
    fn default() -> Self {
        Self {
            evidence_file: None,
            lookback_minutes: default_lookback_minutes(),
            correlation_window_minutes: default_correlation_window_minutes(),
            domains: default_domains(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "provider")]
pub enum ReportConfig {
    /// Render the report into the trace.
    #[default]
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "webhook")]
    Webhook(WebhookReportConfig),
    #[serde(rename = "none")]
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookReportConfig {
    pub url: String,

    /// Name of the environment variable holding the bearer token.
    #[serde(default)]
    pub token_env: Option<String>,

    #[serde(default = "default_webhook_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_webhook_timeout_ms() -> u64 {
    10_000
}

impl WebhookReportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token_env: None,
            timeout_ms: default_webhook_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsOutConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_events_out_path")]
    pub path: String,
    #[serde(default = "default_events_out_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_drop_when_full")]
    pub drop_when_full: bool,
}

fn default_events_out_path() -> String {
    "./run.events.jsonl".to_string()
}

fn default_events_out_capacity() -> usize {
    2048
}

fn default_drop_when_full() -> bool {
    true
}

impl Default for EventsOutConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_events_out_path(),
            channel_capacity: default_events_out_capacity(),
            drop_when_full: default_drop_when_full(),
        }
    }
}
