//! Shared test helpers: a scripted LLM provider and tool fixtures.

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use toolbridge_models::llm::{
    AssistantBlock, GenerationError, GenerationRequest, GenerationResponse, Llm, LlmProvider,
    ToolCall, ToolFunction,
};

/// Replays queued replies in order and records every request.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<GenerationResponse, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn llm(self: &Arc<Self>) -> Llm {
        Llm::new(Arc::clone(self) as Arc<dyn LlmProvider>, "scripted-model")
    }

    pub fn push_text(&self, text: &str) {
        self.replies.lock().push_back(Ok(GenerationResponse {
            content: vec![AssistantBlock::text(text)],
            ..GenerationResponse::default()
        }));
    }

    pub fn push_json(&self, value: &Value) {
        self.push_text(&value.to_string());
    }

    pub fn push_tool_calls(&self, calls: &[(&str, Value)]) {
        let content = calls
            .iter()
            .enumerate()
            .map(|(idx, (name, arguments))| {
                AssistantBlock::tool_call(ToolCall {
                    id: format!("fc_{idx}"),
                    call_id: Some(format!("call_{idx}")),
                    function: ToolFunction {
                        name: (*name).to_string(),
                        arguments: arguments.clone(),
                    },
                })
            })
            .collect();
        self.replies.lock().push_back(Ok(GenerationResponse {
            content,
            ..GenerationResponse::default()
        }));
    }

    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .push_back(Err(GenerationError::Http(message.to_string())));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(
        &self,
        _model: &str,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::InvalidResponse("script exhausted".to_string())))
    }
}

/// A request's messages as JSON text, for substring assertions.
pub fn messages_json(request: &GenerationRequest) -> String {
    serde_json::to_string(&request.messages).unwrap_or_default()
}
