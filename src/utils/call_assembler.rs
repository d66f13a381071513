use crate::types::events::{ToolCallDeltaEvent, ToolCallRequest};

/// Assembles streamed `tool-call-delta` fragments into complete tool-call
/// requests, keyed by call identifier.
///
/// Intended for producers feeding the stage from a backend that streams
/// arguments incrementally. Argument text stays raw: the stage's own strict
/// decoder is the single place untrusted payloads get parsed.
#[derive(Default)]
pub struct ToolCallAssembler {
    partial: Vec<PartialCall>,
}

struct PartialCall {
    tool_call_type: String,
    tool_call_id: String,
    tool_name: String,
    args: String,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment. Unknown identifiers open a new partial call;
    /// known ones append argument text.
    pub fn push(&mut self, fragment: &ToolCallDeltaEvent) {
        if let Some(partial) = self
            .partial
            .iter_mut()
            .find(|p| p.tool_call_id == fragment.tool_call_id)
        {
            partial.args.push_str(&fragment.args_text_delta);
            if partial.tool_name.is_empty() {
                partial.tool_name = fragment.tool_name.clone();
            }
            return;
        }
        self.partial.push(PartialCall {
            tool_call_type: fragment.tool_call_type.clone(),
            tool_call_id: fragment.tool_call_id.clone(),
            tool_name: fragment.tool_name.clone(),
            args: fragment.args_text_delta.clone(),
        });
    }

    /// Number of calls still being assembled.
    pub fn open_calls(&self) -> usize {
        self.partial.len()
    }

    /// Close the call with the given identifier and yield the assembled
    /// request. Returns `None` for unknown identifiers.
    pub fn complete(&mut self, tool_call_id: &str) -> Option<ToolCallRequest> {
        let idx = self
            .partial
            .iter()
            .position(|p| p.tool_call_id == tool_call_id)?;
        let partial = self.partial.remove(idx);
        Some(ToolCallRequest {
            tool_call_type: partial.tool_call_type,
            tool_call_id: partial.tool_call_id,
            tool_name: partial.tool_name,
            args: partial.args,
        })
    }

    /// Close every open call in arrival order.
    pub fn complete_all(&mut self) -> Vec<ToolCallRequest> {
        std::mem::take(&mut self.partial)
            .into_iter()
            .map(|partial| ToolCallRequest {
                tool_call_type: partial.tool_call_type,
                tool_call_id: partial.tool_call_id,
                tool_name: partial.tool_name,
                args: partial.args,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(id: &str, name: &str, delta: &str) -> ToolCallDeltaEvent {
        ToolCallDeltaEvent {
            tool_call_type: "function".to_string(),
            tool_call_id: id.to_string(),
            tool_name: name.to_string(),
            args_text_delta: delta.to_string(),
        }
    }

    #[test]
    fn test_fragments_accumulate_per_call_id() {
        let mut assembler = ToolCallAssembler::new();
        assembler.push(&fragment("c1", "get_weather", r#"{"city"#));
        assembler.push(&fragment("c2", "echo", r#"{"value":1}"#));
        assembler.push(&fragment("c1", "get_weather", r#"":"Tokyo"}"#));
        assert_eq!(assembler.open_calls(), 2);

        let call = assembler.complete("c1").unwrap();
        assert_eq!(call.tool_name, "get_weather");
        assert_eq!(call.args, r#"{"city":"Tokyo"}"#);
        assert_eq!(assembler.open_calls(), 1);
    }

    #[test]
    fn test_unknown_id_completes_to_none() {
        let mut assembler = ToolCallAssembler::new();
        assert!(assembler.complete("missing").is_none());
    }

    #[test]
    fn test_complete_all_preserves_arrival_order() {
        let mut assembler = ToolCallAssembler::new();
        assembler.push(&fragment("c1", "a", "{}"));
        assembler.push(&fragment("c2", "b", "{}"));
        let calls = assembler.complete_all();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool_call_id, "c1");
        assert_eq!(calls[1].tool_call_id, "c2");
        assert_eq!(assembler.open_calls(), 0);
    }
}
