#[cfg(test)]
mod tests {
    use crate::pipeline::pending::PendingInvocations;
    use crate::pipeline::{EventTransform, ToolResultStage, NO_RESULT_SENTINEL};
    use crate::types::events::StreamEvent;
    use crate::types::tool::{handler_fn, ToolDefinition, ToolRegistry};
    use futures::{FutureExt, StreamExt};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio_util::sync::CancellationToken;

    fn echo_registry() -> ToolRegistry {
        ToolRegistry::builder()
            .tool(
                "echo",
                ToolDefinition::new(handler_fn(|args: Value, _ctx| async move {
                    Ok::<_, anyhow::Error>(args.get("value").cloned())
                })),
            )
            .build()
            .unwrap()
    }

    async fn run(registry: ToolRegistry, input: Vec<StreamEvent>) -> Vec<StreamEvent> {
        let stage = ToolResultStage::new(Arc::new(registry), CancellationToken::new());
        let input = futures::stream::iter(input.into_iter().map(Ok::<_, crate::Error>));
        let output = stage.transform(Box::pin(input)).await.unwrap();
        output.map(|item| item.unwrap()).collect().await
    }

    #[test]
    fn test_pending_registry_tracks_ids_until_settlement() {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut pending = PendingInvocations::new();
        assert!(pending.is_empty());

        pending.insert(
            "c1".to_string(),
            async { ("c1".to_string(), StreamEvent::text_delta("settled")) }.boxed(),
        );
        assert!(pending.contains("c1"));
        assert_eq!(pending.len(), 1);

        match pending.poll_settled(&mut cx) {
            Poll::Ready(Some(event)) => assert_eq!(event, StreamEvent::text_delta("settled")),
            other => panic!("expected settled task, got {:?}", other),
        }
        assert!(!pending.contains("c1"));
        assert!(pending.is_empty());
        assert!(matches!(pending.poll_settled(&mut cx), Poll::Ready(None)));
    }

    #[tokio::test]
    async fn test_non_tool_events_pass_through_untouched() {
        let input = vec![
            StreamEvent::text_delta("Hello"),
            StreamEvent::Annotations {
                annotations: vec![json!({"note": 1})],
            },
        ];
        let output = run(echo_registry(), input.clone()).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_forwarded_without_result() {
        let input = vec![StreamEvent::tool_call("c1", "nope", "{}")];
        let output = run(echo_registry(), input.clone()).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_declaration_only_tool_is_not_invoked() {
        let registry = ToolRegistry::builder()
            .tool("display", ToolDefinition::declaration_only())
            .build()
            .unwrap();
        let input = vec![StreamEvent::tool_call("c1", "display", "{}")];
        let output = run(registry, input.clone()).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_decode_failure_settles_without_registering_a_task() {
        let input = vec![StreamEvent::tool_call("c1", "echo", "{bad json")];
        let output = run(echo_registry(), input).await;

        assert_eq!(output.len(), 2);
        match &output[1] {
            StreamEvent::ToolResult(result) => {
                assert_eq!(result.tool_call_id, "c1");
                assert!(result.is_error);
                assert!(result
                    .result
                    .as_str()
                    .unwrap()
                    .contains("Function parameter parsing failed."));
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_result_handler_yields_sentinel() {
        let registry = ToolRegistry::builder()
            .tool(
                "fire_and_forget",
                ToolDefinition::new(handler_fn(|_args, _ctx| async move {
                    Ok::<_, anyhow::Error>(None)
                })),
            )
            .build()
            .unwrap();
        let input = vec![StreamEvent::tool_call("c1", "fire_and_forget", "{}")];
        let output = run(registry, input).await;

        match &output[1] {
            StreamEvent::ToolResult(result) => {
                assert!(!result.is_error);
                assert_eq!(result.result, json!(NO_RESULT_SENTINEL));
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }
}
