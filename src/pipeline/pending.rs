//! Pending-invocation registry.
//!
//! Tracks every in-flight invocation task by its call identifier. An
//! identifier is present from the instant its task is registered until the
//! task resolves; removal happens in the same step that surfaces the task's
//! result, so no settle path can leak an entry. Emptiness is the sole
//! precondition for closing the stage's output stream.

use crate::types::events::StreamEvent;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::collections::HashSet;
use std::task::{Context, Poll};

/// An invocation task: resolves to its call identifier plus the single
/// result event it settled with.
pub(crate) type InvocationFuture = BoxFuture<'static, (String, StreamEvent)>;

#[derive(Default)]
pub(crate) struct PendingInvocations {
    tasks: FuturesUnordered<InvocationFuture>,
    ids: HashSet<String>,
}

impl PendingInvocations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a task under its call identifier. The caller must have
    /// checked [`contains`](Self::contains) first; identifiers are unique.
    pub(crate) fn insert(&mut self, id: String, task: InvocationFuture) {
        debug_assert!(!self.ids.contains(&id));
        self.ids.insert(id);
        self.tasks.push(task);
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    /// Drive all registered tasks cooperatively.
    ///
    /// `Ready(Some(event))` yields one settled result and removes its
    /// identifier in the same step. `Ready(None)` means the registry is
    /// empty; `Pending` means tasks exist but none has settled yet.
    pub(crate) fn poll_settled(&mut self, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        match self.tasks.poll_next_unpin(cx) {
            Poll::Ready(Some((id, event))) => {
                self.ids.remove(&id);
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
