//! Tool definitions and the caller-supplied registry.
//!
//! A [`ToolRegistry`] maps tool names to immutable [`ToolDefinition`]s and is
//! supplied once at stage construction. Declared argument schemas are
//! compiled here, at build time, so per-call validation never pays the
//! compile cost and configuration mistakes surface before any stream runs.

use crate::error::{Error, ErrorContext};
use crate::schema::ArgumentSchema;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Invocation context handed to every handler call.
///
/// The cancellation token is the stream-wide signal; propagating it into
/// actual abort behavior is the handler's responsibility.
#[derive(Debug, Clone)]
pub struct ToolCallContext {
    pub tool_call_id: String,
    pub cancellation: CancellationToken,
}

/// An executable tool body.
///
/// `Ok(Some(value))` is a real result; `Ok(None)` means "settled without a
/// payload" and is rendered as the no-result sentinel so downstream
/// consumers never see an absent result field.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn execute(&self, args: Value, ctx: ToolCallContext) -> anyhow::Result<Option<Value>>;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Value, ToolCallContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<Value>>> + Send,
{
    async fn execute(&self, args: Value, ctx: ToolCallContext) -> anyhow::Result<Option<Value>> {
        (self.f)(args, ctx).await
    }
}

/// Lift a plain async closure into a [`ToolHandler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(Value, ToolCallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Option<Value>>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

/// One tool as declared by the caller. Immutable for the lifetime of a
/// stream.
#[derive(Clone, Default)]
pub struct ToolDefinition {
    pub(crate) schema: Option<Value>,
    pub(crate) handler: Option<Arc<dyn ToolHandler>>,
    pub(crate) on_schema_error: Option<Arc<dyn ToolHandler>>,
}

impl ToolDefinition {
    /// A tool with an executable handler.
    pub fn new(handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            schema: None,
            handler: Some(handler),
            on_schema_error: None,
        }
    }

    /// A tool that is declared to the model but not executable by this
    /// stage. Its requests are forwarded and otherwise left alone.
    pub fn declaration_only() -> Self {
        Self::default()
    }

    /// Declare a JSON Schema the decoded arguments must satisfy.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Declare a handler invoked instead of the normal one when schema
    /// validation fails. Its outcome is treated exactly like a normal
    /// handler's.
    pub fn with_schema_error_handler(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.on_schema_error = Some(handler);
        self
    }
}

/// A registered tool with its schema compiled.
pub(crate) struct RegisteredTool {
    pub(crate) handler: Option<Arc<dyn ToolHandler>>,
    pub(crate) on_schema_error: Option<Arc<dyn ToolHandler>>,
    pub(crate) schema: Option<Arc<ArgumentSchema>>,
}

impl RegisteredTool {
    /// The "tool exists and has a handler" check: everything the invoker
    /// needs, or `None` for declaration-only tools.
    pub(crate) fn dispatched(&self) -> Option<DispatchedTool> {
        Some(DispatchedTool {
            handler: self.handler.clone()?,
            on_schema_error: self.on_schema_error.clone(),
            schema: self.schema.clone(),
        })
    }
}

/// The executable parts of one dispatched tool, detached from the registry
/// so the invocation task owns its own state.
pub(crate) struct DispatchedTool {
    pub(crate) handler: Arc<dyn ToolHandler>,
    pub(crate) on_schema_error: Option<Arc<dyn ToolHandler>>,
    pub(crate) schema: Option<Arc<ArgumentSchema>>,
}

/// Read-only mapping from tool name to definition.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builder accumulating tool declarations; `build` compiles schemas and
/// rejects duplicate names.
pub struct ToolRegistryBuilder {
    tools: Vec<(String, ToolDefinition)>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn tool(mut self, name: impl Into<String>, definition: ToolDefinition) -> Self {
        self.tools.push((name.into(), definition));
        self
    }

    pub fn build(self) -> crate::Result<ToolRegistry> {
        let mut tools: HashMap<String, RegisteredTool> = HashMap::with_capacity(self.tools.len());
        for (name, definition) in self.tools {
            if tools.contains_key(&name) {
                return Err(Error::configuration(
                    format!("duplicate tool name \"{}\"", name),
                    ErrorContext::new().with_tool_name(name.clone()),
                ));
            }
            let schema = match definition.schema {
                Some(ref raw) => {
                    let compiled = ArgumentSchema::compile(raw).map_err(|e| {
                        Error::configuration(
                            format!("invalid argument schema for tool \"{}\": {}", name, e),
                            ErrorContext::new().with_tool_name(name.clone()),
                        )
                    })?;
                    Some(Arc::new(compiled))
                }
                None => None,
            };
            tools.insert(
                name,
                RegisteredTool {
                    handler: definition.handler,
                    on_schema_error: definition.on_schema_error,
                    schema,
                },
            );
        }
        Ok(ToolRegistry { tools })
    }
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_tool_name_rejected() {
        let result = ToolRegistry::builder()
            .tool("echo", ToolDefinition::declaration_only())
            .tool("echo", ToolDefinition::declaration_only())
            .build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate tool name"));
    }

    #[test]
    fn test_invalid_schema_rejected_at_build() {
        let result = ToolRegistry::builder()
            .tool(
                "echo",
                ToolDefinition::declaration_only().with_schema(json!(["not", "a", "schema"])),
            )
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_declaration_only_tool_is_not_dispatchable() {
        let registry = ToolRegistry::builder()
            .tool("echo", ToolDefinition::declaration_only())
            .build()
            .unwrap();
        assert!(registry.contains("echo"));
        assert!(registry.get("echo").unwrap().dispatched().is_none());
    }
}
