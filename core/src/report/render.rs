//! Report bodies for text and HTML channels.

use std::fmt::Write as _;

use serde_json::Value;

use crate::runner::RunResult;

const NO_FINDINGS: &str = "No findings captured.";

pub fn subject(result: &RunResult) -> String {
    format!(
        "[AIC] Incident Investigation Report - Session {}",
        result.session_id
    )
}

/// `deploy_findings` → `Deploy Findings`
pub fn section_title(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Findings are stored as rendered strings; pretty-print the ones that are JSON.
fn pretty_value(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| raw.to_string())
        }
        _ => raw.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_text(result: &RunResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", subject(result));
    let _ = writeln!(
        out,
        "Duration: {:.1}s | Events: {}",
        result.elapsed_seconds, result.event_count
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Response:");
    let _ = writeln!(out, "{}", result.response);

    let _ = writeln!(out);
    if result.sub_agent_findings.is_empty() {
        let _ = writeln!(out, "{NO_FINDINGS}");
    }
    for (key, value) in &result.sub_agent_findings {
        let _ = writeln!(out, "{}:", section_title(key));
        let _ = writeln!(out, "{}", pretty_value(value));
    }
    out
}

pub fn render_html(result: &RunResult) -> String {
    let mut out = String::new();
    out.push_str("<html><body>\n");
    out.push_str("<h2>Incident Investigation Report</h2>\n");
    let _ = writeln!(
        out,
        "<p><b>Session:</b> {}<br><b>Duration:</b> {:.1}s<br><b>Events:</b> {}</p>",
        escape_html(&result.session_id),
        result.elapsed_seconds,
        result.event_count
    );
    out.push_str("<h3>Response</h3>\n");
    let _ = writeln!(
        out,
        "<pre style=\"white-space: pre-wrap\">{}</pre>",
        escape_html(&result.response)
    );

    if result.sub_agent_findings.is_empty() {
        let _ = writeln!(out, "<p><i>{NO_FINDINGS}</i></p>");
    }
    for (key, value) in &result.sub_agent_findings {
        let _ = writeln!(out, "<h3>{}</h3>", escape_html(&section_title(key)));
        let _ = writeln!(out, "<pre>{}</pre>", escape_html(&pretty_value(value)));
    }
    out.push_str("</body></html>\n");
    out
}
