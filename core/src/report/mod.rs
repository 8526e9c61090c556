mod render;
mod traits;

pub use render::{render_html, render_text, section_title, subject};
pub use traits::ReportDispatcher;

use crate::runner::RunResult;
use crate::trace::TraceEmitter;

/// Hands the result to the dispatcher. Failures are traced and swallowed;
/// the return value only says whether delivery succeeded.
pub async fn dispatch_report(
    dispatcher: &dyn ReportDispatcher,
    result: &RunResult,
    emitter: &TraceEmitter,
) -> bool {
    match dispatcher.dispatch(result).await {
        Ok(()) => {
            emitter.report_sent(dispatcher.name());
            true
        }
        Err(e) => {
            emitter.report_failed(dispatcher.name(), &e);
            false
        }
    }
}
