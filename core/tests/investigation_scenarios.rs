mod common;

use std::sync::Arc;

use aic_core::api::{
    handle_event, run_investigation, AppConfig, AppContext, FindingsConfig, InvestigationArgs,
    InvestigationError, InvestigationEvent, RecordingSink, RunResult, TraceEmitter, TraceTag,
};
use common::{args_of, CountingDispatcher, FixedServices, ScriptedRuntime, SESSION_ID};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn recording_emitter() -> (TraceEmitter, RecordingSink) {
    let sink = RecordingSink::new();
    (TraceEmitter::plain(Arc::new(sink.clone())), sink)
}

async fn run(
    runtime: &ScriptedRuntime,
    dispatcher: &CountingDispatcher,
    emitter: &TraceEmitter,
) -> Result<RunResult, InvestigationError> {
    let findings = FindingsConfig::default();
    run_investigation(
        InvestigationArgs {
            runtime,
            dispatcher,
            emitter,
            app_name: "aic-commander",
            user_id: "system",
            findings: &findings,
            events_out: None,
        },
        &json!({"detail-type": "CloudWatch Alarm State Change", "detail": {"alarmName": "HighErrorRate"}}),
    )
    .await
}

fn deploy_scenario() -> Vec<InvestigationEvent> {
    vec![
        InvestigationEvent::new("Commander").with_transfer("deploy_agent"),
        InvestigationEvent::new("deploy_agent").with_call(
            "analyze_deployments",
            args_of(json!({"service": "checkout", "time_window": {"start": "a", "end": "b"}})),
        ),
        InvestigationEvent::new("deploy_agent").with_response(
            "analyze_deployments",
            json!({"deployments_found": 3, "correlation_results": {}}),
        ),
        InvestigationEvent::new("Commander")
            .with_text("Found risky deploy X")
            .final_response(),
    ]
}

#[tokio::test]
async fn transfer_tool_call_and_final_answer_are_traced_once_each() {
    let runtime = ScriptedRuntime::new(deploy_scenario());
    let dispatcher = CountingDispatcher::default();
    let (emitter, sink) = recording_emitter();

    let result = run(&runtime, &dispatcher, &emitter).await.unwrap();

    assert_eq!(result.event_count, 4);
    assert_eq!(result.response, "Found risky deploy X");
    assert_eq!(result.session_id, SESSION_ID);
    assert_eq!(sink.count(TraceTag::A2aTransfer), 1);
    assert_eq!(sink.count(TraceTag::ToolCall), 1);
    assert_eq!(sink.count(TraceTag::ToolResult), 1);
    assert_eq!(sink.count(TraceTag::FinalResponse), 1);
    assert_eq!(sink.count(TraceTag::Reasoning), 0);
    assert_eq!(
        sink.with_tag(TraceTag::A2aTransfer),
        vec!["Commander → deploy_agent".to_string()]
    );
    assert_eq!(dispatcher.calls(), 1);
    assert_eq!(sink.count(TraceTag::Report), 1);
}

#[tokio::test]
async fn agent_lines_follow_author_changes() {
    let authors = ["Commander", "Commander", "logs_agent", "Commander", "deploy_agent"];
    let events = authors.iter().map(|a| InvestigationEvent::new(*a)).collect();
    let runtime = ScriptedRuntime::new(events);
    let (emitter, sink) = recording_emitter();

    run(&runtime, &CountingDispatcher::default(), &emitter)
        .await
        .unwrap();

    let agent_lines = sink.with_tag(TraceTag::Agent);
    let enters = agent_lines.iter().filter(|l| l.starts_with(">>>")).count();
    let exits = agent_lines.iter().filter(|l| l.starts_with("<<<")).count();
    assert_eq!(enters, 4);
    assert_eq!(exits, enters - 1);
    assert_eq!(agent_lines[0], ">>> Entering: Commander");
    assert_eq!(agent_lines[1], "<<< Exiting: Commander");
}

#[tokio::test]
async fn multiple_final_responses_are_space_joined() {
    let runtime = ScriptedRuntime::new(vec![
        InvestigationEvent::new("Commander").with_text("Root cause:").final_response(),
        InvestigationEvent::new("Commander").with_text("thinking aloud"),
        InvestigationEvent::new("Commander")
            .with_text("bad deploy abc123.")
            .final_response(),
    ]);
    let (emitter, sink) = recording_emitter();

    let result = run(&runtime, &CountingDispatcher::default(), &emitter)
        .await
        .unwrap();

    assert_eq!(result.response, "Root cause: bad deploy abc123.");
    assert_eq!(result.event_count, 3);
    assert_eq!(sink.count(TraceTag::Reasoning), 1);
}

#[tokio::test]
async fn only_present_findings_reach_the_result() {
    let runtime = ScriptedRuntime::new(deploy_scenario())
        .with_state(json!({"deploy_findings": "<envelope str>"}));
    let (emitter, sink) = recording_emitter();

    let result = run(&runtime, &CountingDispatcher::default(), &emitter)
        .await
        .unwrap();

    assert_eq!(
        result.sub_agent_findings.keys().collect::<Vec<_>>(),
        vec!["deploy_findings"]
    );
    assert_eq!(result.sub_agent_findings["deploy_findings"], "<envelope str>");
    assert_eq!(
        sink.with_tag(TraceTag::State),
        vec![
            "logs_findings = (not set)".to_string(),
            "metrics_findings = (not set)".to_string(),
            "deploy_findings = <envelope str>".to_string(),
        ]
    );
}

#[tokio::test]
async fn dispatch_failure_does_not_change_the_result() {
    let state = json!({"logs_findings": {"summary": "5xx spike"}});
    let ok_runtime = ScriptedRuntime::new(deploy_scenario()).with_state(state.clone());
    let failing_runtime = ScriptedRuntime::new(deploy_scenario()).with_state(state);
    let (emitter, sink) = recording_emitter();

    let mut ok = run(&ok_runtime, &CountingDispatcher::default(), &emitter)
        .await
        .unwrap();
    let failing = CountingDispatcher::failing();
    let mut failed = run(&failing_runtime, &failing, &emitter).await.unwrap();

    // wall-clock only
    ok.elapsed_seconds = 0.0;
    failed.elapsed_seconds = 0.0;
    assert_eq!(
        serde_json::to_string(&ok).unwrap(),
        serde_json::to_string(&failed).unwrap()
    );
    assert_eq!(failing.calls(), 1);
    assert!(sink
        .with_tag(TraceTag::Report)
        .iter()
        .any(|l| l.contains("smtp connection refused")));
}

#[tokio::test]
async fn session_open_failure_is_fatal() {
    let runtime = ScriptedRuntime {
        fail_session: true,
        ..ScriptedRuntime::new(deploy_scenario())
    };
    let dispatcher = CountingDispatcher::default();
    let (emitter, sink) = recording_emitter();

    let err = run(&runtime, &dispatcher, &emitter).await.unwrap_err();
    assert!(matches!(err, InvestigationError::SessionOpen(_)));
    assert_eq!(dispatcher.calls(), 0);
    assert_eq!(sink.count(TraceTag::Start), 0);
}

#[tokio::test]
async fn stream_error_is_fatal_after_partial_trace() {
    let mut runtime = ScriptedRuntime::new(deploy_scenario());
    runtime.events.insert(2, Err("model throttled".to_string()));
    let dispatcher = CountingDispatcher::default();
    let (emitter, sink) = recording_emitter();

    let err = run(&runtime, &dispatcher, &emitter).await.unwrap_err();
    assert!(matches!(err, InvestigationError::Stream(_)));
    assert_eq!(sink.count(TraceTag::ToolCall), 1);
    assert_eq!(sink.count(TraceTag::Done), 0);
    assert_eq!(dispatcher.calls(), 0);
}

#[tokio::test]
async fn state_read_failure_is_fatal() {
    let runtime = ScriptedRuntime {
        fail_state: true,
        ..ScriptedRuntime::new(deploy_scenario())
    };
    let err = run(&runtime, &CountingDispatcher::default(), &recording_emitter().0)
        .await
        .unwrap_err();
    assert!(matches!(err, InvestigationError::StateRead(_)));
}

fn context(runtime: ScriptedRuntime) -> (AppContext, Arc<ScriptedRuntime>) {
    let runtime = Arc::new(runtime);
    let factory = FixedServices {
        runtime: runtime.clone(),
        dispatcher: Arc::new(CountingDispatcher::default()),
    };
    let (emitter, _) = recording_emitter();
    (
        AppContext::new(AppConfig::default(), emitter, Some(Arc::new(factory))),
        runtime,
    )
}

#[tokio::test]
async fn handler_wraps_bare_alarm_and_returns_200() {
    let (ctx, runtime) = context(ScriptedRuntime::new(deploy_scenario()));

    let resp = handle_event(&ctx, json!({"alarmName": "HighErrorRate"})).await;

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body["response"], "Found risky deploy X");
    assert_eq!(resp.body["event_count"], 4);
    assert_eq!(resp.body["sub_agent_findings"], json!({}));

    let prompt = runtime.last_prompt().unwrap();
    let alarm = aic_core::api::extract_alarm(&prompt).unwrap();
    assert_eq!(
        alarm,
        json!({"detail": {"alarmName": "HighErrorRate"}, "detail-type": "CloudWatch Alarm State Change"})
    );
}

#[tokio::test]
async fn handler_reports_fatal_errors_as_500() {
    let (ctx, _) = context(ScriptedRuntime {
        fail_session: true,
        ..Default::default()
    });

    let resp = handle_event(&ctx, json!({"detail-type": "x", "detail": {}})).await;

    assert_eq!(resp.status_code, 500);
    let msg = resp.body["error"].as_str().unwrap();
    assert!(msg.contains("session open failed"));
}

#[test]
fn blocking_handler_runs_without_a_runtime() {
    let (ctx, _) = context(ScriptedRuntime::new(deploy_scenario()));
    let resp = aic_core::api::handle_event_blocking(&ctx, json!({"alarmName": "x"}));
    assert!(resp.is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_handler_offloads_inside_a_runtime() {
    let (ctx, _) = context(ScriptedRuntime::new(deploy_scenario()));
    let resp = aic_core::api::handle_event_blocking(&ctx, json!({"alarmName": "x"}));
    assert_eq!(resp.body["response"], Value::from("Found risky deploy X"));
}

#[tokio::test]
async fn missing_services_factory_is_a_500() {
    let (emitter, _) = recording_emitter();
    let ctx = AppContext::new(AppConfig::default(), emitter, None);
    let resp = handle_event(&ctx, json!({})).await;
    assert_eq!(resp.status_code, 500);
}
