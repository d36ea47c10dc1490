use serde_json::Value;
use std::io::{self, Read};

/// Simulation result piped on stdin. `None` when stdin is a terminal or
/// nothing was piped.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_payload(&buffer)
}

/// A result payload is a JSON object; blank input means no payload.
fn parse_payload(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin payload: {e}"))?;
    if !value.is_object() {
        return Err("stdin payload must be a JSON object holding a simulation result".into());
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_pipe_is_no_payload() {
        assert!(parse_payload("  \n").unwrap().is_none());
    }

    #[test]
    fn test_object_payload_accepted() {
        let value = parse_payload(r#"{ "status": "completed" }"#).unwrap();
        assert_eq!(value, Some(json!({ "status": "completed" })));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let err = parse_payload("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
        let err = parse_payload("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stdin payload"));
    }
}
