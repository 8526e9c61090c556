use std::collections::BTreeMap;
use std::time::Instant;

use futures::StreamExt;
use serde_json::{Map, Value};

use crate::config::FindingsConfig;
use crate::error::InvestigationError;
use crate::events_out::{write_investigation_event, EventsOutTx};
use crate::report::{dispatch_report, ReportDispatcher};
use crate::state::{PhaseTracker, RunPhase};
use crate::trace::{DelegationTracker, EventText, TextKind, TraceEmitter};
use crate::util::{compact_json, is_truthy, round_tenths, truncate};

use super::prompt::build_prompt;
use super::traits::AgentRuntime;
use super::types::RunResult;

pub struct InvestigationArgs<'a> {
    pub runtime: &'a dyn AgentRuntime,
    pub dispatcher: &'a dyn ReportDispatcher,
    pub emitter: &'a TraceEmitter,
    pub app_name: &'a str,
    pub user_id: &'a str,
    pub findings: &'a FindingsConfig,
    pub events_out: Option<EventsOutTx>,
}

fn abort(phases: &mut PhaseTracker, err: InvestigationError) -> InvestigationError {
    if let Err(e) = phases.advance(RunPhase::Aborted) {
        tracing::debug!(error = %e, "abort from {:?} rejected", phases.phase());
    }
    tracing::error!(error = %err, "investigation aborted");
    err
}

/// Drives one investigation from session open to report dispatch.
///
/// Session-open, stream and state-read failures abort the run. Dispatch
/// failures are traced and never change the returned result.
pub async fn run_investigation(
    args: InvestigationArgs<'_>,
    alarm: &Value,
) -> Result<RunResult, InvestigationError> {
    let InvestigationArgs {
        runtime,
        dispatcher,
        emitter,
        app_name,
        user_id,
        findings,
        events_out,
    } = args;
    let mut phases = PhaseTracker::new();

    let session = match runtime.create_session(app_name, user_id).await {
        Ok(s) => s,
        Err(e) => return Err(abort(&mut phases, InvestigationError::SessionOpen(e))),
    };
    phases.advance(RunPhase::SessionOpen)?;
    emitter.start(&session.id, runtime.root_agent());

    let prompt = build_prompt(alarm);
    let started = Instant::now();
    let mut stream = match runtime
        .run_stream(app_name, user_id, &session.id, prompt)
        .await
    {
        Ok(s) => s,
        Err(e) => return Err(abort(&mut phases, InvestigationError::Stream(e))),
    };
    phases.advance(RunPhase::Streaming)?;

    let mut delegation = DelegationTracker::new();
    let mut event_count: u64 = 0;
    let mut final_parts: Vec<String> = Vec::new();

    while let Some(item) = stream.next().await {
        let ev = match item {
            Ok(ev) => ev,
            Err(e) => return Err(abort(&mut phases, InvestigationError::Stream(e))),
        };
        event_count += 1;
        write_investigation_event(events_out.as_ref(), &ev).await;

        let step = delegation.observe(&ev);
        if let Some(EventText {
            kind: TextKind::Final,
            text,
        }) = emitter.emit_event(&step, &ev)
        {
            final_parts.push(text);
        }
    }
    let elapsed_seconds = round_tenths(started.elapsed().as_secs_f64());
    phases.advance(RunPhase::Drained)?;
    emitter.done(elapsed_seconds, event_count, &session.id, &delegation);

    let state = match runtime
        .session_state(app_name, user_id, &session.id)
        .await
    {
        Ok(s) => s,
        Err(e) => return Err(abort(&mut phases, InvestigationError::StateRead(e))),
    };
    let sub_agent_findings = collect_findings(&state, findings, emitter);
    phases.advance(RunPhase::StateRead)?;

    let result = RunResult {
        response: final_parts.join(" "),
        session_id: session.id,
        elapsed_seconds,
        event_count,
        sub_agent_findings,
    };

    dispatch_report(dispatcher, &result, emitter).await;
    phases.advance(RunPhase::Dispatched)?;

    Ok(result)
}

/// Reads the well-known keys in order. Absent, empty, `false` and zero values
/// are traced as not set and left out of the bundle.
pub fn collect_findings(
    state: &Map<String, Value>,
    cfg: &FindingsConfig,
    emitter: &TraceEmitter,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for key in &cfg.keys {
        match state.get(key).filter(|v| is_truthy(v)) {
            Some(value) => {
                let rendered = compact_json(value);
                emitter.state_entry(key, Some(&rendered));
                out.insert(key.clone(), truncate(&rendered, cfg.value_max));
            }
            None => emitter.state_entry(key, None),
        }
    }
    out
}
