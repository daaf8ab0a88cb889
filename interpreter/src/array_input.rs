//! Parsing of the loose array literals users type into form fields.

use serde_json::Value;

use crate::error::{InterpreterError, Result};

/// Turns a raw form value into a list of element values.
///
/// Arrays pass through and other non-string values are wrapped. Strings that
/// start with `[` must be valid JSON; anything else is split on commas into
/// trimmed string tokens, quotes included.
pub fn parse_array_input(raw: &Value) -> Result<Vec<Value>> {
    let s = match raw {
        Value::Array(items) => return Ok(items.clone()),
        Value::String(s) => s,
        other => return Ok(vec![other.clone()]),
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(vec![]);
    }
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(single) => Ok(vec![single]),
            Err(e) => {
                log::debug!("array literal is not valid JSON: {e}");
                Err(InterpreterError::InvalidJsonArray(trimmed.to_string()))
            }
        };
    }
    Ok(trimmed
        .split(',')
        .map(|part| Value::String(part.trim().to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!("1, 2, 3"), json!(["1", "2", "3"]) ; "comma separated strings")]
    #[test_case(json!("[1,2,3]"), json!([1, 2, 3]) ; "json numbers")]
    #[test_case(json!("  "), json!([]) ; "blank")]
    #[test_case(json!("abc"), json!(["abc"]) ; "single token")]
    #[test_case(json!("\"a\", 'b'"), json!(["\"a\"", "'b'"]) ; "quotes are kept")]
    #[test_case(json!(["x", 1]), json!(["x", 1]) ; "array passes through")]
    #[test_case(json!(7), json!([7]) ; "scalar is wrapped")]
    fn parses_array_literals(raw: Value, expected: Value) {
        assert_eq!(Value::Array(parse_array_input(&raw).unwrap()), expected);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_array_input(&json!(" [1,2,3 ")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON array: [1,2,3");
    }
}
