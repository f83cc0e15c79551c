//! Small helpers shared across the connector.

use serde_json::Value;

/// Upper bound on serialized payloads written to logs.
pub const LOG_PAYLOAD_CAP: usize = 4000;

/// Renders a JSON value for logging, capped at [`LOG_PAYLOAD_CAP`] characters so a
/// pathological gateway response cannot flood the log stream.
pub fn truncate_json(value: &Value) -> String {
    truncate_str(&value.to_string(), LOG_PAYLOAD_CAP)
}

/// Truncates a string to at most `max` characters, marking the cut.
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max).collect();
    truncated.push_str("...<truncated>");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_payloads_pass_through() {
        assert_eq!(truncate_json(&json!({ "url": "x" })), "{\"url\":\"x\"}");
    }

    #[test]
    fn long_payloads_are_capped_and_marked() {
        let long = "x".repeat(LOG_PAYLOAD_CAP * 2);
        let rendered = truncate_json(&json!({ "body": long }));
        assert!(rendered.len() < LOG_PAYLOAD_CAP + 32);
        assert!(rendered.ends_with("...<truncated>"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "é".repeat(10);
        let truncated = truncate_str(&s, 5);
        assert!(truncated.starts_with(&"é".repeat(5)));
        assert!(truncated.ends_with("...<truncated>"));
    }
}
