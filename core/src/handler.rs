//! Process boundary: alarm normalization and the status-coded response.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::InvestigationError;
use crate::events_out::start_events_out;
use crate::runner::{run_investigation, InvestigationArgs, RunResult};
use crate::state::spawn_state_logger;

pub const ALARM_DETAIL_TYPE: &str = "CloudWatch Alarm State Change";

/// Wraps a bare alarm detail; events that already carry `detail` or
/// `detail-type` pass through unchanged.
pub fn normalize_alarm_event(event: Value) -> Value {
    let wrapped = match event.as_object() {
        Some(obj) => !obj.contains_key("detail-type") && !obj.contains_key("detail"),
        None => true,
    };
    if wrapped {
        json!({ "detail": event, "detail-type": ALARM_DETAIL_TYPE })
    } else {
        event
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn ok(result: &RunResult) -> Self {
        Self {
            status_code: 200,
            body: serde_json::to_value(result).unwrap_or(Value::Null),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

pub async fn investigate(ctx: &AppContext, event: Value) -> Result<RunResult, InvestigationError> {
    let cfg = ctx.cfg();
    let emitter = ctx.emitter();
    emitter.received(&event);

    let alarm = normalize_alarm_event(event);
    let services = ctx.build_services().await?;
    if let Some(rx) = services.runtime.state_events() {
        spawn_state_logger(rx);
    }

    let events_out = start_events_out(&cfg.events_out)
        .await
        .map_err(|e| InvestigationError::Config(format!("{e:#}")))?;

    let result = run_investigation(
        InvestigationArgs {
            runtime: services.runtime.as_ref(),
            dispatcher: services.dispatcher.as_ref(),
            emitter,
            app_name: &cfg.app_name,
            user_id: &cfg.user_id,
            findings: &cfg.findings,
            events_out: events_out.as_ref().map(|o| o.sender()),
        },
        &alarm,
    )
    .await;

    if let Some(out) = events_out {
        let dropped = out.finish().await;
        if dropped > 0 {
            tracing::warn!(dropped, "events_out dropped lines");
        }
    }

    result
}

/// Runs one investigation and wraps the outcome as a 200 or 500 response.
pub async fn handle_event(ctx: &AppContext, event: Value) -> HandlerResponse {
    match investigate(ctx, event).await {
        Ok(result) => HandlerResponse::ok(&result),
        Err(e) => {
            tracing::error!(error = %e, "investigation failed");
            HandlerResponse::error(e.to_string())
        }
    }
}

/// Blocking entry point. Inside a running tokio runtime the investigation is
/// moved to a dedicated worker thread with its own runtime.
pub fn handle_event_blocking(ctx: &AppContext, event: Value) -> HandlerResponse {
    if tokio::runtime::Handle::try_current().is_ok() {
        let ctx = ctx.clone();
        let worker = std::thread::spawn(move || run_on_fresh_runtime(&ctx, event));
        match worker.join() {
            Ok(resp) => resp,
            Err(_) => HandlerResponse::error("investigation worker panicked"),
        }
    } else {
        run_on_fresh_runtime(ctx, event)
    }
}

fn run_on_fresh_runtime(ctx: &AppContext, event: Value) -> HandlerResponse {
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt.block_on(handle_event(ctx, event)),
        Err(e) => HandlerResponse::error(format!("failed to start runtime: {e}")),
    }
}
