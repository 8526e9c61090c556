use serde_json::Value;

/// Suffix appended to display strings that were cut short.
pub const TRUNCATION_MARKER: &str = "...";

/// Truncates `s` to at most `max` characters, appending [`TRUNCATION_MARKER`].
///
/// The marker is not counted against `max`. Lengths are measured in `char`s so a
/// multi-byte character is never split.
pub fn truncate(s: &str, max: usize) -> String {
    truncate_with(s, max, TRUNCATION_MARKER)
}

pub fn truncate_with(s: &str, max: usize, marker: &str) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((end, _)) => {
            let mut out = String::with_capacity(end + marker.len());
            out.push_str(&s[..end]);
            out.push_str(marker);
            out
        }
    }
}

/// Renders a JSON value for display: strings verbatim, everything else compact.
pub fn compact_json(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Empty in the "nothing to show" sense: null, or an empty string, array or object.
pub fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Truthiness for finding values: blank values, `false` and zero count as unset.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        other => !is_blank(other),
    }
}

pub fn round_tenths(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}
