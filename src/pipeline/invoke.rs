//! Tool invoker and result emission.
//!
//! One invocation task per dispatched tool-call request. The task resolves
//! the effective handler (validating arguments when a schema is declared),
//! invokes it with the stream-wide cancellation signal in context, and
//! settles to exactly one correlated tool-result event. Every settle path
//! runs through the same two constructors, so the correlation contract has
//! a single code path.

use super::pending::InvocationFuture;
use crate::error::InvocationError;
use crate::schema::ValidationIssue;
use crate::types::events::{StreamEvent, ToolCallRequest, ToolResultEvent};
use crate::types::tool::{DispatchedTool, ToolCallContext, ToolHandler};
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Placeholder payload for handlers that settle without a value. Consumers
/// never receive an absent result field.
pub const NO_RESULT_SENTINEL: &str = "<no result>";

/// Correlation fields copied from a request into its eventual result.
#[derive(Debug, Clone)]
pub(crate) struct CallBinding {
    pub(crate) tool_call_type: String,
    pub(crate) tool_call_id: String,
    pub(crate) tool_name: String,
}

impl CallBinding {
    pub(crate) fn from_request(request: &ToolCallRequest) -> Self {
        Self {
            tool_call_type: request.tool_call_type.clone(),
            tool_call_id: request.tool_call_id.clone(),
            tool_name: request.tool_name.clone(),
        }
    }
}

/// Construct a successful tool-result event for a call.
pub(crate) fn result_event(binding: &CallBinding, result: Value) -> StreamEvent {
    StreamEvent::ToolResult(ToolResultEvent {
        tool_call_type: binding.tool_call_type.clone(),
        tool_call_id: binding.tool_call_id.clone(),
        tool_name: binding.tool_name.clone(),
        result,
        is_error: false,
    })
}

/// Construct an error-flagged tool-result event; the payload is the
/// failure's diagnostic string.
pub(crate) fn error_event(binding: &CallBinding, error: &InvocationError) -> StreamEvent {
    StreamEvent::ToolResult(ToolResultEvent {
        tool_call_type: binding.tool_call_type.clone(),
        tool_call_id: binding.tool_call_id.clone(),
        tool_name: binding.tool_name.clone(),
        result: Value::String(error.to_string()),
        is_error: true,
    })
}

/// The effective handler for one call, resolved before invocation.
enum ResolvedHandler {
    /// No schema declared, or validation passed.
    Normal(Arc<dyn ToolHandler>),
    /// Validation failed and the tool declares a schema-error handler.
    SchemaError(Arc<dyn ToolHandler>),
    /// Validation failed with no fallback; the call settles as an error.
    ValidationFailed(Vec<ValidationIssue>),
}

fn resolve_handler(tool: &DispatchedTool, args: &Value) -> ResolvedHandler {
    let Some(schema) = &tool.schema else {
        return ResolvedHandler::Normal(tool.handler.clone());
    };
    match schema.validate(args) {
        Ok(()) => ResolvedHandler::Normal(tool.handler.clone()),
        Err(issues) => match &tool.on_schema_error {
            Some(handler) => ResolvedHandler::SchemaError(handler.clone()),
            None => ResolvedHandler::ValidationFailed(issues),
        },
    }
}

/// Build the invocation task for one dispatched call. The future owns every
/// piece of state it needs and resolves to `(call id, result event)` on all
/// paths, which is what keeps the pending registry's bookkeeping
/// unconditional.
pub(crate) fn run_invocation(
    tool: DispatchedTool,
    binding: CallBinding,
    args: Value,
    cancellation: CancellationToken,
) -> InvocationFuture {
    let id = binding.tool_call_id.clone();
    async move {
        let event = invoke(tool, &binding, args, cancellation).await;
        (id, event)
    }
    .boxed()
}

async fn invoke(
    tool: DispatchedTool,
    binding: &CallBinding,
    args: Value,
    cancellation: CancellationToken,
) -> StreamEvent {
    let handler = match resolve_handler(&tool, &args) {
        ResolvedHandler::Normal(handler) | ResolvedHandler::SchemaError(handler) => handler,
        ResolvedHandler::ValidationFailed(issues) => {
            debug!(
                call_id = %binding.tool_call_id,
                tool = %binding.tool_name,
                issues = issues.len(),
                "argument validation failed"
            );
            return error_event(binding, &InvocationError::Validation(issues));
        }
    };

    let ctx = ToolCallContext {
        tool_call_id: binding.tool_call_id.clone(),
        cancellation,
    };

    match handler.execute(args, ctx).await {
        Ok(Some(value)) => result_event(binding, value),
        Ok(None) => result_event(binding, Value::String(NO_RESULT_SENTINEL.to_string())),
        Err(err) => error_event(binding, &InvocationError::Handler(format!("{:#}", err))),
    }
}
