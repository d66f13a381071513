//! Tool-result transform stage: the core execution engine of this crate.
//!
//! # Overview
//!
//! The stage wraps a stream of [`StreamEvent`]s and returns a stream that
//! forwards every input event unchanged, in input order, while concurrently
//! executing tool-call requests and interleaving their correlated
//! tool-result events whenever the underlying invocations settle.
//!
//! ```text
//! Input Events ──► Forward (in order) ──────────────► Output Events
//!       │                                                  ▲
//!       └─ tool-call ─► decode ─► validate ─► invoke ──────┘
//!                          │         (pending registry)
//!                          └─ decode failure ─► error tool-result
//! ```
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ToolResultStage`] | Stage configuration (registry + cancellation) |
//! | [`ToolResultStream`] | The wrapped output stream and its state machine |
//! | [`EventTransform`] | Trait for event-stream operators |
//! | [`decode`] | Strict argument decoding |
//! | [`invoke`] | Handler resolution, invocation, result emission |
//!
//! ## Lifecycle
//!
//! `Open` (forwarding input, invocations may be in flight) →
//! `Draining` (input exhausted, waiting for the pending registry to empty) →
//! `Closed` (terminal). The stream never closes while an invocation is
//! outstanding; a handler that never settles blocks the transition
//! indefinitely rather than being dropped.
//!
//! ## Concurrency model
//!
//! Cooperative and single-threaded: invocation futures are polled by the
//! output stream itself, interleaved with input polling. Nothing is
//! spawned, shared, or locked. Result events appear in settle order, which
//! is independent of input order.

pub mod decode;
pub mod invoke;
mod pending;

#[cfg(test)]
mod tests;

pub use invoke::NO_RESULT_SENTINEL;

use crate::types::events::{StreamEvent, ToolCallRequest};
use crate::types::tool::ToolRegistry;
use crate::{BoxStream, InvocationError, PipeResult};
use futures::Stream;
use invoke::CallBinding;
use pending::PendingInvocations;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Core operator interface for event-stream stages.
#[async_trait::async_trait]
pub trait EventTransform: Send + Sync {
    /// A transform takes a stream of events and returns a new stream of
    /// events.
    async fn transform(
        &self,
        input: BoxStream<'static, StreamEvent>,
    ) -> PipeResult<BoxStream<'static, StreamEvent>>;
}

/// The tool-result stage: forwards every event, executes tool calls.
///
/// Constructed once per stream from a read-only [`ToolRegistry`] and the
/// stream-wide [`CancellationToken`]. The token is plumbed into every
/// handler invocation; the stage itself never cancels it.
pub struct ToolResultStage {
    registry: Arc<ToolRegistry>,
    cancellation: CancellationToken,
}

impl ToolResultStage {
    pub fn new(registry: Arc<ToolRegistry>, cancellation: CancellationToken) -> Self {
        Self {
            registry,
            cancellation,
        }
    }

    /// Wrap an event stream. The returned stream forwards every input item
    /// and interleaves tool results as invocations settle.
    pub fn transform_stream(&self, input: BoxStream<'static, StreamEvent>) -> ToolResultStream {
        ToolResultStream {
            input,
            registry: self.registry.clone(),
            cancellation: self.cancellation.clone(),
            pending: PendingInvocations::new(),
            ready: VecDeque::new(),
            state: StageState::Open,
        }
    }
}

#[async_trait::async_trait]
impl EventTransform for ToolResultStage {
    async fn transform(
        &self,
        input: BoxStream<'static, StreamEvent>,
    ) -> PipeResult<BoxStream<'static, StreamEvent>> {
        Ok(Box::pin(self.transform_stream(input)))
    }
}

/// Per-stream lifecycle. `Draining` is never skipped while invocations are
/// outstanding.
enum StageState {
    Open,
    Draining,
    Closed,
}

/// The stage's output stream.
///
/// Emits `Ok` events (forwarded input plus synthesized tool results) and
/// forwards upstream `Err` items verbatim without terminating.
pub struct ToolResultStream {
    input: BoxStream<'static, StreamEvent>,
    registry: Arc<ToolRegistry>,
    cancellation: CancellationToken,
    pending: PendingInvocations,
    /// Synthesized events waiting to be emitted (decode failures,
    /// duplicate-id rejections). Drained before anything else.
    ready: VecDeque<StreamEvent>,
    state: StageState,
}

impl ToolResultStream {
    /// Number of invocations currently in flight.
    pub fn pending_invocations(&self) -> usize {
        self.pending.len()
    }

    /// Inspect one forwarded event and dispatch if it is a tool-call
    /// request. Called after the event has been queued for downstream
    /// emission; dispatch only ever adds to `ready` or `pending`.
    fn dispatch(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::ToolCall(request) => self.dispatch_tool_call(request),
            // Forward-only kinds. The variant set is closed and matched
            // without a wildcard: a new kind fails to compile until it is
            // given an explicit dispatch decision here.
            StreamEvent::TextDelta { .. }
            | StreamEvent::Reasoning { .. }
            | StreamEvent::ToolCallDelta(_)
            | StreamEvent::ToolResult(_)
            | StreamEvent::StepFinish { .. }
            | StreamEvent::Finish { .. }
            | StreamEvent::Error { .. }
            | StreamEvent::ResponseMetadata { .. }
            | StreamEvent::Annotations { .. }
            | StreamEvent::Data { .. } => {}
        }
    }

    fn dispatch_tool_call(&mut self, request: &ToolCallRequest) {
        let Some(tool) = self.registry.get(&request.tool_name) else {
            debug!(
                tool = %request.tool_name,
                call_id = %request.tool_call_id,
                "tool not registered; request forwarded without dispatch"
            );
            return;
        };
        let Some(dispatched) = tool.dispatched() else {
            debug!(
                tool = %request.tool_name,
                call_id = %request.tool_call_id,
                "tool is declaration-only; request forwarded without dispatch"
            );
            return;
        };

        let binding = CallBinding::from_request(request);

        // Decode synchronously: a malformed payload settles immediately and
        // never registers a task.
        let args = match decode::decode_arguments(&request.args) {
            Ok(args) => args,
            Err(err) => {
                self.ready.push_back(invoke::error_event(&binding, &err));
                return;
            }
        };

        if self.pending.contains(&request.tool_call_id) {
            warn!(
                call_id = %request.tool_call_id,
                tool = %request.tool_name,
                "duplicate tool call id while original is in flight; rejecting"
            );
            self.ready.push_back(invoke::error_event(
                &binding,
                &InvocationError::DuplicateCall(request.tool_call_id.clone()),
            ));
            return;
        }

        debug!(
            call_id = %request.tool_call_id,
            tool = %request.tool_name,
            "dispatching tool invocation"
        );
        let task = invoke::run_invocation(dispatched, binding, args, self.cancellation.clone());
        self.pending.insert(request.tool_call_id.clone(), task);
    }
}

impl Stream for ToolResultStream {
    type Item = PipeResult<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(event) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            match this.state {
                StageState::Closed => return Poll::Ready(None),

                StageState::Open => {
                    // Settled invocations flush ahead of new input.
                    if let Poll::Ready(Some(event)) = this.pending.poll_settled(cx) {
                        return Poll::Ready(Some(Ok(event)));
                    }

                    match this.input.as_mut().poll_next(cx) {
                        Poll::Ready(Some(Ok(event))) => {
                            this.dispatch(&event);
                            return Poll::Ready(Some(Ok(event)));
                        }
                        Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
                        Poll::Ready(None) => {
                            debug!(
                                pending = this.pending.len(),
                                "input exhausted; draining pending invocations"
                            );
                            this.state = StageState::Draining;
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                }

                StageState::Draining => match this.pending.poll_settled(cx) {
                    Poll::Ready(Some(event)) => return Poll::Ready(Some(Ok(event))),
                    Poll::Ready(None) => {
                        this.state = StageState::Closed;
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
            }
        }
    }
}
