mod load;
mod types;

pub use load::{get_aic_data_dir, load_default, load_from_path};
pub use types::{
    AppConfig, ColorMode, EventsOutConfig, FindingsConfig, LoggingConfig, PlaybookRuntimeConfig,
    ReplayRuntimeConfig, ReportConfig, RuntimeConfig, TraceConfig, WebhookReportConfig,
};
