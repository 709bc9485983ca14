use serde_json::{Map, Value, json};

/// Decodes a response body the way every endpoint expects it: nothing at all
/// becomes `{}`, valid JSON is returned as is, anything else is wrapped as
/// `{ "raw": <text> }`.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes);

    if text.trim().is_empty() {
        return Value::Object(Map::new());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => json!({ "raw": text }),
    }
}

/// Some endpoints answer 200 with `"success": false` for a rejected request.
pub(crate) fn is_soft_failure(data: &Value) -> bool {
    matches!(data.get("success"), Some(Value::Bool(false)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"  \n"), json!({}));
    }

    #[test]
    fn invalid_json_is_kept_raw() {
        assert_eq!(parse_body(b"not json"), json!({ "raw": "not json" }));
    }

    #[test]
    fn json_is_decoded() {
        assert_eq!(parse_body(br#"{"data":42}"#), json!({ "data": 42 }));
        assert_eq!(parse_body(b"[1,2]"), json!([1, 2]));
    }

    #[test]
    fn success_false_is_a_soft_failure() {
        assert!(is_soft_failure(&json!({ "success": false, "message": "x" })));
        assert!(!is_soft_failure(&json!({ "success": true })));
        assert!(!is_soft_failure(&json!({})));
    }
}
