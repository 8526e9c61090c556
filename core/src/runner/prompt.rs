use serde_json::Value;

const PROMPT_HEADER: &str = "A CloudWatch alarm has fired. Here is the raw event:";
const PROMPT_DIRECTIVE: &str =
    "Execute the full incident investigation: DETECT → PLAN → INVESTIGATE → DECIDE → REPORT.";
const JSON_FENCE_OPEN: &str = "```json\n";
const JSON_FENCE_CLOSE: &str = "\n```";

/// Initiating prompt: the pretty-printed alarm in a fenced block plus the
/// investigation directive.
pub fn build_prompt(alarm: &Value) -> String {
    let pretty = serde_json::to_string_pretty(alarm).unwrap_or_else(|_| alarm.to_string());
    format!("{PROMPT_HEADER}\n\n{JSON_FENCE_OPEN}{pretty}{JSON_FENCE_CLOSE}\n\n{PROMPT_DIRECTIVE}")
}

/// Recovers the alarm payload embedded by [`build_prompt`].
pub fn extract_alarm(prompt: &str) -> Option<Value> {
    let start = prompt.find(JSON_FENCE_OPEN)? + JSON_FENCE_OPEN.len();
    let len = prompt[start..].find(JSON_FENCE_CLOSE)?;
    serde_json::from_str(&prompt[start..start + len]).ok()
}
