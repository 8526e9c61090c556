use serde_json::{Map, Value};

use crate::util::is_truthy;

use super::model::{EventActions, FunctionCall, FunctionResponse, InvestigationEvent};

pub const UNKNOWN_AUTHOR: &str = "?";

/// Parses one JSONL line emitted by an agent runtime.
pub fn parse_runtime_line(line: &str) -> anyhow::Result<Option<InvestigationEvent>> {
    let s = line.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v: Value = serde_json::from_str(s)
        .map_err(|e| anyhow::anyhow!("invalid runtime event json: {e}"))?;
    parse_runtime_event(&v).map(Some)
}

/// Builds an [`InvestigationEvent`] from a raw runtime event.
///
/// Accepts the ADK-style shape, where tool activity and text live in
/// `content.parts[]` (`text` / `function_call` / `function_response`, snake or
/// camel case), as well as the flattened shape produced by serialising an
/// `InvestigationEvent` back out. When the raw event carries no explicit final
/// flag, an event is final if it is complete (not partial), has text and has
/// no tool activity.
pub fn parse_runtime_event(v: &Value) -> anyhow::Result<InvestigationEvent> {
    let obj = v
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("runtime event is not a json object"))?;

    let author = obj
        .get("author")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();

    let actions = obj.get("actions").map(parse_actions).unwrap_or_default();

    let mut function_calls = Vec::new();
    let mut function_responses = Vec::new();
    let mut text_parts = Vec::new();

    if let Some(parts) = obj
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
    {
        for part in parts {
            if let Some(t) = part.get("text").and_then(Value::as_str) {
                text_parts.push(t.to_string());
            }
            if let Some(fc) = field(part, "function_call", "functionCall") {
                function_calls.push(parse_call(fc)?);
            }
            if let Some(fr) = field(part, "function_response", "functionResponse") {
                function_responses.push(parse_response(fr)?);
            }
        }
    }

    // Flattened shape.
    if let Some(calls) = obj.get("function_calls").and_then(Value::as_array) {
        for fc in calls {
            function_calls.push(parse_call(fc)?);
        }
    }
    if let Some(responses) = obj.get("function_responses").and_then(Value::as_array) {
        for fr in responses {
            function_responses.push(parse_response(fr)?);
        }
    }
    if let Some(texts) = obj.get("text_parts").and_then(Value::as_array) {
        text_parts.extend(texts.iter().filter_map(Value::as_str).map(str::to_string));
    }

    let partial = obj.get("partial").and_then(Value::as_bool).unwrap_or(false);

    let mut ev = InvestigationEvent {
        author,
        actions,
        function_calls,
        function_responses,
        text_parts,
        is_final_response: false,
        partial,
    };

    ev.is_final_response = match field(v, "is_final_response", "isFinalResponse") {
        Some(flag) => flag.as_bool().unwrap_or(false),
        None => !ev.partial && !ev.has_tool_activity() && ev.combined_text().is_some(),
    };

    Ok(ev)
}

fn field<'a>(v: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    v.get(snake)
        .or_else(|| v.get(camel))
        .filter(|x| !x.is_null())
}

fn parse_actions(v: &Value) -> EventActions {
    let transfer_to_agent = field(v, "transfer_to_agent", "transferToAgent")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let escalate = v.get("escalate").map_or(false, is_truthy);

    let state_delta = field(v, "state_delta", "stateDelta")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    EventActions {
        transfer_to_agent,
        escalate,
        state_delta,
    }
}

fn parse_call(v: &Value) -> anyhow::Result<FunctionCall> {
    let name = v
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("function call without name"))?
        .to_string();
    let args = match v.get("args") {
        Some(Value::Object(m)) => m.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            let mut m = Map::new();
            m.insert("value".to_string(), other.clone());
            m
        }
    };
    Ok(FunctionCall { name, args })
}

fn parse_response(v: &Value) -> anyhow::Result<FunctionResponse> {
    let name = v
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("function response without name"))?
        .to_string();
    Ok(FunctionResponse {
        name,
        response: v.get("response").cloned().unwrap_or(Value::Null),
    })
}
