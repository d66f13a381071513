//! # ai-tool-stream
//!
//! A pass-through tool-invocation stage for AI event pipelines: forwards
//! every model event unchanged while concurrently executing tool-call
//! requests and interleaving their results.
//!
//! ## Overview
//!
//! Streaming backends emit a sequence of token-level events (text deltas,
//! reasoning, tool calls, finish markers, ...). This crate inserts a
//! transform stage into that sequence. The stage never buffers, reorders or
//! drops input events; it only adds `tool-result` events, one per dispatched
//! tool-call request, whenever the underlying invocation settles. The stream
//! completes only after every in-flight invocation has produced its result.
//!
//! ## Core Philosophy
//!
//! - **Lossless forwarding**: output is a superset of the input, in input
//!   order, with results interleaved at settle time
//! - **Per-call isolation**: decode, validation and handler failures become
//!   error-flagged results; they never terminate the stream
//! - **Cooperative concurrency**: invocations are polled by the output
//!   stream itself; no spawning, no locks
//! - **Caller-owned tools**: handlers, schemas and cancellation are supplied
//!   from outside and treated as capabilities
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_tool_stream::{
//!     handler_fn, EventTransform, StreamEvent, ToolDefinition, ToolRegistry, ToolResultStage,
//! };
//! use futures::StreamExt;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> ai_tool_stream::Result<()> {
//!     let registry = ToolRegistry::builder()
//!         .tool(
//!             "echo",
//!             ToolDefinition::new(handler_fn(|args, _ctx| async move {
//!                 Ok(args.get("value").cloned())
//!             })),
//!         )
//!         .build()?;
//!
//!     let stage = ToolResultStage::new(Arc::new(registry), CancellationToken::new());
//!
//!     let input = futures::stream::iter(vec![
//!         StreamEvent::text_delta("Checking..."),
//!         StreamEvent::tool_call("call_1", "echo", r#"{"value": 42}"#),
//!     ])
//!     .map(Ok::<_, ai_tool_stream::Error>);
//!     let mut output = stage.transform(Box::pin(input)).await?;
//!     while let Some(event) = output.next().await {
//!         println!("{:?}", event?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | The transform stage, argument decoding, tool invocation |
//! | [`types`] | Core type definitions (events, tools, registry) |
//! | [`schema`] | Argument schema validation |
//! | [`utils`] | Tool-call fragment assembly |

pub mod pipeline;
pub mod schema;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use pipeline::{EventTransform, ToolResultStage, ToolResultStream, NO_RESULT_SENTINEL};
pub use schema::{ArgumentSchema, ValidationIssue};
pub use types::{
    events::{
        FinishReason, StreamEvent, TokenUsage, ToolCallDeltaEvent, ToolCallRequest,
        ToolResultEvent,
    },
    tool::{
        handler_fn, ToolCallContext, ToolDefinition, ToolHandler, ToolRegistry,
        ToolRegistryBuilder,
    },
};
pub use utils::ToolCallAssembler;

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, InvocationError};
