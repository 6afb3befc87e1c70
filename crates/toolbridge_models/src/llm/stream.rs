//! Streaming generation events.

use super::error::GenerationError;
use super::types::{AssistantBlock, GenerationResponse, ToolCall};
use core::pin::Pin;
use futures::Stream;

/// An event emitted while a response is generated.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// The response has started.
    Start {
        /// Provider response id, when known.
        id: Option<String>,
    },
    /// A chunk of output text.
    TextDelta {
        /// The text chunk.
        text: String,
    },
    /// A complete function call.
    ToolCall(ToolCall),
    /// The assembled response. Always the last event of a successful stream.
    Completed(GenerationResponse),
}

/// Boxed stream of [`StreamEvent`]s.
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, GenerationError>> + Send>>;

/// Replays a finished response as events.
///
/// Used by providers without incremental output: one `Start`, one event per
/// text or tool-call block, then `Completed`.
#[must_use]
pub fn replay(response: GenerationResponse) -> GenerationStream {
    let mut events = vec![StreamEvent::Start {
        id: response.id.clone(),
    }];
    for block in &response.content {
        match block {
            AssistantBlock::Text(block) if !block.text.is_empty() => {
                events.push(StreamEvent::TextDelta {
                    text: block.text.clone(),
                });
            }
            AssistantBlock::ToolCall(call) => events.push(StreamEvent::ToolCall(call.clone())),
            AssistantBlock::Text(_) | AssistantBlock::Reasoning(_) => {}
        }
    }
    events.push(StreamEvent::Completed(response));
    Box::pin(futures::stream::iter(events.into_iter().map(Ok)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ToolFunction, Usage};
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn replay_emits_blocks_in_order_then_completes() {
        let response = GenerationResponse {
            id: Some("resp_1".to_string()),
            content: vec![
                AssistantBlock::text("Checking"),
                AssistantBlock::text(""),
                AssistantBlock::tool_call(ToolCall {
                    id: "fc_1".to_string(),
                    call_id: Some("call_1".to_string()),
                    function: ToolFunction {
                        name: "get_stock_quote".to_string(),
                        arguments: json!({"symbol": "IBM"}),
                    },
                }),
            ],
            usage: Usage::default(),
        };

        let events: Vec<StreamEvent> = replay(response)
            .map(|event| event.expect("replay never fails"))
            .collect()
            .await;

        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], StreamEvent::Start { id: Some(id) } if id == "resp_1"));
        assert!(matches!(&events[1], StreamEvent::TextDelta { text } if text == "Checking"));
        assert!(
            matches!(&events[2], StreamEvent::ToolCall(call) if call.function.name == "get_stock_quote")
        );
        assert!(matches!(&events[3], StreamEvent::Completed(done) if done.text() == "Checking"));
    }
}
