//! Drives a scripted model turn through the tool-result stage and prints
//! every emitted event.
//!
//! Run with: cargo run --example echo_tool_stream

use ai_tool_stream::{
    handler_fn, EventTransform, FinishReason, StreamEvent, TokenUsage, ToolDefinition,
    ToolRegistry, ToolResultStage,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_tool_stream=debug".into()),
        )
        .init();

    let registry = ToolRegistry::builder()
        .tool(
            "echo",
            ToolDefinition::new(handler_fn(|args, _ctx| async move {
                Ok(args.get("value").cloned())
            }))
            .with_schema(json!({
                "type": "object",
                "properties": {"value": {}},
                "required": ["value"]
            })),
        )
        .tool(
            "fail",
            ToolDefinition::new(handler_fn(|_args, _ctx| async move {
                anyhow::bail!("this tool always fails")
            })),
        )
        .build()?;

    let stage = ToolResultStage::new(Arc::new(registry), CancellationToken::new());

    let turn = vec![
        StreamEvent::text_delta("Let me check that for you."),
        StreamEvent::tool_call("call_1", "echo", r#"{"value": {"city": "Tokyo"}}"#),
        StreamEvent::tool_call("call_2", "fail", "{}"),
        StreamEvent::tool_call("call_3", "echo", "{not valid json"),
        StreamEvent::finish(
            FinishReason::ToolCalls,
            TokenUsage {
                prompt_tokens: 21,
                completion_tokens: 9,
            },
        ),
    ];

    let input = futures::stream::iter(turn.into_iter().map(Ok::<_, ai_tool_stream::Error>));
    let mut output = stage.transform(Box::pin(input)).await?;

    while let Some(event) = output.next().await {
        match event {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(err) => eprintln!("stream error: {}", err),
        }
    }

    Ok(())
}
