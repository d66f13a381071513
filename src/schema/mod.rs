//! Argument schema validation using JSON Schema.
//!
//! Thin adapter over the `jsonschema` crate: schemas are compiled once at
//! registry construction time (Draft 7) and checked per invocation. The
//! error iterator borrows the instance, so issues are materialized into
//! owned [`ValidationIssue`] values immediately.

use jsonschema::{Draft, JSONSchema};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single structured validation issue.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON pointer to the offending location in the arguments
    pub path: String,
    /// Human-readable description of what failed
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Raised when a declared argument schema cannot be compiled.
#[derive(Debug, thiserror::Error)]
#[error("Failed to compile argument schema: {0}")]
pub struct SchemaCompileError(pub String);

/// A compiled argument schema for one tool.
pub struct ArgumentSchema {
    compiled: JSONSchema,
}

impl std::fmt::Debug for ArgumentSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentSchema").finish_non_exhaustive()
    }
}

impl ArgumentSchema {
    /// Compile a raw JSON Schema value (Draft 7).
    pub fn compile(schema: &Value) -> Result<Self, SchemaCompileError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| SchemaCompileError(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Validate decoded arguments against the schema.
    ///
    /// Returns the full list of issues on failure, not just the first one.
    pub fn validate(&self, args: &Value) -> Result<(), Vec<ValidationIssue>> {
        match self.compiled.validate(args) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|e| ValidationIssue {
                    path: e.instance_path.to_string(),
                    message: e.to_string(),
                })
                .collect()),
        }
    }

    /// Cheap yes/no check without issue collection.
    pub fn is_valid(&self, args: &Value) -> bool {
        self.compiled.is_valid(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value_number_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "value": {"type": "number"}
            },
            "required": ["value"]
        })
    }

    #[test]
    fn test_valid_arguments_pass() {
        let schema = ArgumentSchema::compile(&value_number_schema()).unwrap();
        assert!(schema.validate(&json!({"value": 42})).is_ok());
        assert!(schema.is_valid(&json!({"value": 1.5})));
    }

    #[test]
    fn test_type_mismatch_reports_path_and_message() {
        let schema = ArgumentSchema::compile(&value_number_schema()).unwrap();
        let issues = schema.validate(&json!({"value": "x"})).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/value");
        assert!(issues[0].message.contains("number"));
    }

    #[test]
    fn test_missing_required_property() {
        let schema = ArgumentSchema::compile(&value_number_schema()).unwrap();
        let issues = schema.validate(&json!({})).unwrap_err();
        assert!(!issues.is_empty());
        assert!(issues[0].message.contains("value"));
    }

    #[test]
    fn test_invalid_schema_fails_to_compile() {
        let err = ArgumentSchema::compile(&json!(["not", "a", "schema"])).unwrap_err();
        assert!(err.to_string().contains("Failed to compile"));
    }
}
