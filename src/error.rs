use crate::schema::ValidationIssue;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Call identifier the error relates to, if any
    pub call_id: Option<String>,
    /// Tool name the error relates to, if any
    pub tool_name: Option<String>,
    /// Additional context about the error (e.g., expected shape, actual value)
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Unified error type for the stage and its configuration surface.
///
/// Per-call invocation failures never show up here: they are isolated into
/// error-flagged tool-result events (see [`InvocationError`]) and the stream
/// keeps flowing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Stream error: {message}{}", format_context(.context))]
    Stream {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref call_id) = ctx.call_id {
        parts.push(format!("call: {}", call_id));
    }
    if let Some(ref tool) = ctx.tool_name {
        parts.push(format!("tool: {}", tool));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new stream error with structured context
    pub fn stream(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Stream {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Stream { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Per-call failure taxonomy. Each value is converted into exactly one
/// error-flagged tool-result event; none of them terminate the stream.
///
/// The display forms double as the diagnostic strings placed in the result
/// payload, so downstream consumers see a human-readable message.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Malformed argument text (not valid JSON).
    #[error("Function parameter parsing failed. {0}")]
    Decode(String),

    /// Well-formed arguments that fail the tool's declared schema, with no
    /// custom schema-error handler to fall back to.
    #[error("Function parameter validation failed. {}", issues_json(.0))]
    Validation(Vec<ValidationIssue>),

    /// Any failure raised by the tool's own execution, including a custom
    /// schema-error handler.
    #[error("Error: {0}")]
    Handler(String),

    /// A second tool-call request reused an identifier that is still
    /// in flight. The duplicate is rejected; the original task is untouched.
    #[error("Duplicate tool call id \"{0}\". Invocation rejected.")]
    DuplicateCall(String),
}

fn issues_json(issues: &[ValidationIssue]) -> String {
    serde_json::to_string(issues).unwrap_or_else(|_| {
        issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_embeds_parse_message() {
        let err = InvocationError::Decode("expected value at line 1 column 2".to_string());
        let msg = err.to_string();
        assert!(msg.starts_with("Function parameter parsing failed."));
        assert!(msg.contains("line 1 column 2"));
    }

    #[test]
    fn test_validation_error_renders_issues_as_json() {
        let err = InvocationError::Validation(vec![ValidationIssue {
            path: "/value".to_string(),
            message: "\"x\" is not of type \"number\"".to_string(),
        }]);
        let msg = err.to_string();
        assert!(msg.starts_with("Function parameter validation failed."));
        assert!(msg.contains("/value"));
        assert!(msg.contains("number"));
    }

    #[test]
    fn test_error_context_display() {
        let err = Error::configuration(
            "duplicate tool name \"echo\"",
            ErrorContext::new().with_tool_name("echo"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: duplicate tool name \"echo\" (tool: echo)"
        );
    }
}
