mod log;
mod noop;
mod webhook;

pub use log::LogReportDispatcher;
pub use noop::NoopReportDispatcher;
pub use webhook::{WebhookError, WebhookReportDispatcher};
