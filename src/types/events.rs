//! Stream event model.
//!
//! [`StreamEvent`] is a closed, internally-tagged variant set covering every
//! kind a model backend emits during one streamed turn. This crate only
//! interprets `tool-call` (dispatch) and produces `tool-result`; all other
//! kinds are opaque payloads forwarded verbatim.
//!
//! Wire format: the tag field is `type` in kebab-case, payload fields are
//! camelCase (`toolCallId`, `textDelta`, `isError`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event of a streamed model turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// Partial assistant text.
    #[serde(rename_all = "camelCase")]
    TextDelta { text_delta: String },

    /// Partial reasoning text.
    #[serde(rename_all = "camelCase")]
    Reasoning { text_delta: String },

    /// A complete tool invocation request with raw argument text.
    ToolCall(ToolCallRequest),

    /// A fragment of a tool call still being streamed by the backend.
    ToolCallDelta(ToolCallDeltaEvent),

    /// The outcome of a tool invocation, correlated by call identifier.
    ToolResult(ToolResultEvent),

    /// One generation step finished; the turn may continue.
    #[serde(rename_all = "camelCase")]
    StepFinish {
        finish_reason: FinishReason,
        usage: TokenUsage,
        is_continued: bool,
    },

    /// The turn finished.
    #[serde(rename_all = "camelCase")]
    Finish {
        finish_reason: FinishReason,
        usage: TokenUsage,
    },

    /// Backend-reported error payload.
    Error { error: Value },

    /// Response identity metadata.
    #[serde(rename_all = "camelCase")]
    ResponseMetadata {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        model_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },

    /// Message annotations attached mid-stream.
    Annotations { annotations: Vec<Value> },

    /// Arbitrary data parts attached mid-stream.
    Data { data: Vec<Value> },
}

impl StreamEvent {
    /// Convenience constructor for a text fragment.
    pub fn text_delta(text: impl Into<String>) -> Self {
        StreamEvent::TextDelta {
            text_delta: text.into(),
        }
    }

    /// Convenience constructor for a complete tool-call request.
    pub fn tool_call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: impl Into<String>,
    ) -> Self {
        StreamEvent::ToolCall(ToolCallRequest {
            tool_call_type: "function".to_string(),
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args: args.into(),
        })
    }

    /// Convenience constructor for a finish event.
    pub fn finish(finish_reason: FinishReason, usage: TokenUsage) -> Self {
        StreamEvent::Finish {
            finish_reason,
            usage,
        }
    }
}

/// A tool invocation request from the model.
///
/// `args` is raw, untrusted text; it is only decoded by the stage's strict
/// argument decoder. `tool_call_type` is a declared call-kind tag forwarded
/// verbatim, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRequest {
    pub tool_call_type: String,
    pub tool_call_id: String,
    pub tool_name: String,
    pub args: String,
}

/// A fragment of a tool call whose arguments are still streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallDeltaEvent {
    pub tool_call_type: String,
    pub tool_call_id: String,
    pub tool_name: String,
    pub args_text_delta: String,
}

/// The outcome of one tool invocation.
///
/// Correlation contract: `tool_call_id`, `tool_call_type` and `tool_name`
/// are copies of the triggering request's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultEvent {
    pub tool_call_type: String,
    pub tool_call_id: String,
    pub tool_name: String,
    /// Handler return value, or a diagnostic string when `is_error` is set.
    pub result: Value,
    #[serde(default)]
    pub is_error: bool,
}

/// Why a step or turn stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    Other,
    Unknown,
}

/// Token accounting attached to step-finish and finish events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}
