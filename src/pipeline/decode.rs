//! Argument decoder: raw tool-call argument text to a structural value.
//!
//! Decoding is strict structural JSON parsing and nothing else; untrusted
//! content is never executed or evaluated. `serde_json` deserializes into an
//! inert value tree with no prototype chain or shared object internals, so
//! the injection risk class this decoder guards against elsewhere does not
//! exist here.

use crate::error::InvocationError;
use serde_json::Value;

/// Decode raw argument text. Failure carries a human-readable message
/// embedding the parse error.
pub fn decode_arguments(raw: &str) -> Result<Value, InvocationError> {
    serde_json::from_str(raw).map_err(|e| InvocationError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_well_formed_arguments() {
        let args = decode_arguments(r#"{"value": 42}"#).unwrap();
        assert_eq!(args, json!({"value": 42}));
    }

    #[test]
    fn test_malformed_text_fails_with_parse_error() {
        let err = decode_arguments("{bad json").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Function parameter parsing failed."));
        assert!(msg.contains("key must be a string") || msg.contains("expected"));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert!(decode_arguments("").is_err());
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(decode_arguments(r#"{"value": 1} trailing"#).is_err());
    }
}
