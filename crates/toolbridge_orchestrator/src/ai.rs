//! LLM tool-calling orchestrator.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use toolbridge_models::llm::{
    ExtractionError, GenerationError, GenerationRequest, GenerationResponse, GenerationStream,
    Llm, Message, ToolCall, ToolDefinition, ToolResultStatus,
};
use toolbridge_tools::{ToolExecutor, ToolRegistry, ToolResult};

/// Default bound on tool-calling iterations.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;

/// User input: a single message or a prepared conversation.
#[derive(Debug, Clone)]
pub enum RunInput {
    /// One user message.
    Text(String),
    /// A full message history.
    Messages(Vec<Message>),
}

impl From<&str> for RunInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RunInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Message>> for RunInput {
    fn from(messages: Vec<Message>) -> Self {
        Self::Messages(messages)
    }
}

/// One executed function call.
#[derive(Debug, Clone)]
pub struct ToolCallOutcome {
    /// Tool the model asked for.
    pub tool_name: String,
    /// Provider call id linking the result to the call.
    pub call_id: Option<String>,
    /// Executor result; failures are reported here, not as errors.
    pub result: ToolResult,
}

impl ToolCallOutcome {
    /// The outcome as a tool-result message for a follow-up turn.
    ///
    /// `None` when the provider supplied no call id to answer.
    #[must_use]
    pub fn to_message(&self) -> Option<Message> {
        let call_id = self.call_id.clone()?;
        let status = if self.result.success {
            ToolResultStatus::Success
        } else {
            ToolResultStatus::Error
        };
        Some(Message::tool_outcome(call_id, self.result.to_llm_output(), status))
    }
}

/// What [`AiOrchestrator::run`] produced.
#[derive(Debug, Clone)]
pub enum OrchestratorOutput {
    /// The model answered without calling tools.
    Response(GenerationResponse),
    /// The model called tools; each call was executed once.
    ToolCalls {
        /// The raw model response.
        response: GenerationResponse,
        /// The calls, in output order.
        tool_calls: Vec<ToolCall>,
        /// One outcome per call, in the same order.
        tool_results: Vec<ToolCallOutcome>,
    },
}

impl OrchestratorOutput {
    /// The raw model response.
    #[must_use]
    pub fn response(&self) -> &GenerationResponse {
        match self {
            Self::Response(response) | Self::ToolCalls { response, .. } => response,
        }
    }

    /// Executed tool outcomes; empty when no tools were called.
    #[must_use]
    pub fn tool_results(&self) -> &[ToolCallOutcome] {
        match self {
            Self::Response(_) => &[],
            Self::ToolCalls { tool_results, .. } => tool_results,
        }
    }

    /// JSON summary with `output_text`, `tool_calls` and `tool_results`.
    ///
    /// ```json
    /// {
    ///   "output_text": "",
    ///   "tool_calls": [{"name": "add", "call_id": "call_0", "arguments": {"a": 1, "b": 2}}],
    ///   "tool_results": [{"tool_name": "add", "success": true, "data": {"sum": 3}, "execution_time_ms": 0.4}]
    /// }
    /// ```
    #[must_use]
    pub fn to_json(&self) -> Value {
        let (calls, results): (Vec<Value>, Vec<Value>) = match self {
            Self::Response(_) => (Vec::new(), Vec::new()),
            Self::ToolCalls {
                tool_calls,
                tool_results,
                ..
            } => tool_calls
                .iter()
                .zip(tool_results)
                .map(|(call, outcome)| {
                    (
                        json!({
                            "name": call.function.name,
                            "call_id": call.call_id,
                            "arguments": decode_arguments(&call.function.arguments),
                        }),
                        json!(outcome.result),
                    )
                })
                .unzip(),
        };

        json!({
            "output_text": self.response().text(),
            "tool_calls": calls,
            "tool_results": results,
        })
    }
}

/// Sends input and the registry's tools to an LLM and executes the calls
/// it requests.
///
/// Tool results are returned to the caller and never sent back to the
/// model; a follow-up turn is the caller's decision.
#[derive(Debug, Clone)]
pub struct AiOrchestrator {
    llm: Llm,
    registry: Arc<ToolRegistry>,
    executor: ToolExecutor,
    max_tool_iterations: usize,
}

impl AiOrchestrator {
    /// Creates an orchestrator over `registry`.
    #[must_use]
    pub fn new(llm: Llm, registry: Arc<ToolRegistry>) -> Self {
        tracing::info!(model = llm.model_name(), "AI orchestrator initialized");
        Self {
            llm,
            executor: ToolExecutor::new(Arc::clone(&registry)),
            registry,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Sets the tool-calling iteration bound.
    #[must_use]
    pub fn with_max_tool_iterations(mut self, iterations: usize) -> Self {
        self.max_tool_iterations = iterations;
        self
    }

    /// Model name without provider prefix.
    #[must_use]
    pub fn model(&self) -> &str {
        self.llm.model_name()
    }

    /// The tool-calling iteration bound.
    #[must_use]
    pub fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }

    /// Names of the tools offered to the model.
    #[must_use]
    pub fn available_tools(&self) -> Vec<String> {
        self.registry.list_tools()
    }

    /// Runs one model turn and executes any function calls it returns.
    ///
    /// `extra_tools` are offered alongside the registry's tools.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the model call fails. Tool failures
    /// are reported inside [`ToolCallOutcome::result`].
    pub async fn run(
        &self,
        input: impl Into<RunInput>,
        instructions: Option<&str>,
        extra_tools: Vec<ToolDefinition>,
    ) -> Result<OrchestratorOutput, GenerationError> {
        let request = self.build_request(input.into(), instructions, extra_tools);
        tracing::info!(
            model = self.model(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "calling model"
        );

        let response = self.llm.generate(request).await?;
        let tool_calls: Vec<ToolCall> = response.tool_calls().into_iter().cloned().collect();
        if tool_calls.is_empty() {
            return Ok(OrchestratorOutput::Response(response));
        }

        tracing::info!(count = tool_calls.len(), "model requested tool calls");
        let mut tool_results = Vec::with_capacity(tool_calls.len());
        for call in &tool_calls {
            let arguments = decode_arguments(&call.function.arguments);
            tracing::debug!(tool = %call.function.name, "executing requested tool");
            let result = self.executor.execute(&call.function.name, arguments).await;
            tool_results.push(ToolCallOutcome {
                tool_name: call.function.name.clone(),
                call_id: call.call_id.clone(),
                result,
            });
        }

        Ok(OrchestratorOutput::ToolCalls {
            response,
            tool_calls,
            tool_results,
        })
    }

    /// Streams one model turn.
    ///
    /// Function calls arrive as [`StreamEvent::ToolCall`] events and are
    /// not executed here.
    ///
    /// [`StreamEvent::ToolCall`]: toolbridge_models::llm::StreamEvent::ToolCall
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the stream cannot be opened.
    pub async fn stream(
        &self,
        input: impl Into<RunInput>,
        instructions: Option<&str>,
        extra_tools: Vec<ToolDefinition>,
    ) -> Result<GenerationStream, GenerationError> {
        let request = self.build_request(input.into(), instructions, extra_tools);
        tracing::info!(
            model = self.model(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "starting streaming response"
        );
        self.llm.stream(request).await
    }

    /// Runs one model turn with structured output bound to `T`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if the call fails or the output does
    /// not deserialize into `T`.
    pub async fn run_structured<T: JsonSchema + DeserializeOwned>(
        &self,
        input: impl Into<RunInput>,
        instructions: Option<&str>,
    ) -> Result<T, ExtractionError> {
        let request = self.build_request(input.into(), instructions, Vec::new());
        self.llm.generate_structured(request).await
    }

    /// Runs one model turn constrained by a raw JSON schema.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if the call fails or the output is
    /// not JSON.
    pub async fn run_structured_value(
        &self,
        input: impl Into<RunInput>,
        instructions: Option<&str>,
        schema: Value,
    ) -> Result<Value, ExtractionError> {
        let request = self.build_request(input.into(), instructions, Vec::new());
        self.llm.generate_structured_value(request, schema).await
    }

    /// Structured run bounded by [`max_tool_iterations`](Self::max_tool_iterations).
    ///
    /// The model is called at most once; tool calls it makes are not
    /// executed in this mode.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidRequest`] (wrapped) when the bound
    /// is zero, otherwise the errors of [`run_structured`](Self::run_structured).
    pub async fn run_with_tool_loop<T: JsonSchema + DeserializeOwned>(
        &self,
        input: impl Into<RunInput>,
        instructions: Option<&str>,
    ) -> Result<T, ExtractionError> {
        if self.max_tool_iterations == 0 {
            tracing::warn!("max_tool_iterations is zero, not calling the model");
            return Err(GenerationError::InvalidRequest(
                "max_tool_iterations must be at least 1".to_string(),
            )
            .into());
        }
        tracing::debug!(iteration = 1, max = self.max_tool_iterations, "tool loop iteration");
        self.run_structured(input, instructions).await
    }

    /// Executes a registered tool directly, bypassing the model.
    pub async fn execute_tool_manually(&self, tool_name: &str, arguments: Value) -> ToolResult {
        self.executor.execute(tool_name, arguments).await
    }

    fn build_request(
        &self,
        input: RunInput,
        instructions: Option<&str>,
        extra_tools: Vec<ToolDefinition>,
    ) -> GenerationRequest {
        let mut tools = self.registry.to_llm_tool_format();
        tools.extend(extra_tools);

        let mut request = match input {
            RunInput::Text(text) => GenerationRequest::new(text),
            RunInput::Messages(messages) => GenerationRequest::default().history(messages),
        }
        .tools(tools);

        if let Some(instructions) = instructions {
            request = request.system(instructions);
        }
        request
    }
}

/// Providers may deliver arguments as a JSON string; decode it if so.
fn decode_arguments(arguments: &Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| arguments.clone()),
        other => other.clone(),
    }
}
