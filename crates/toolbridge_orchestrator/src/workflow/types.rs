//! Workflow request and response envelopes.

use serde::{Deserialize, Serialize};
use toolbridge_http::{HttpRequestSpec, HttpResponseSpec};

/// Input to [`WorkflowOrchestrator::execute`](super::WorkflowOrchestrator::execute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    /// What the user wants done.
    pub user_instructions: String,
    /// Registered tools the model may choose from.
    pub tool_ids: Vec<String>,
    /// Whether to have the model narrate the API response.
    #[serde(default)]
    pub format_response: bool,
    /// Guidance for the narration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format_instructions: Option<String>,
}

impl WorkflowRequest {
    /// A request without response formatting.
    #[must_use]
    pub fn new<S: Into<String>>(
        user_instructions: impl Into<String>,
        tool_ids: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            user_instructions: user_instructions.into(),
            tool_ids: tool_ids.into_iter().map(Into::into).collect(),
            format_response: false,
            response_format_instructions: None,
        }
    }

    /// Turns on response formatting with optional guidance.
    #[must_use]
    pub fn formatted(mut self, instructions: Option<String>) -> Self {
        self.format_response = true;
        self.response_format_instructions = instructions;
        self
    }
}

/// Terminal workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Every mandatory stage completed.
    Success,
    /// A stage failed; see `error_stage`.
    Error,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Resolving tool ids against the registry.
    ToolRetrieval,
    /// Rendering tool definitions as prompt context.
    ToolContextGeneration,
    /// Letting the model write the HTTP request.
    LlmSelection,
    /// Executing the request.
    ApiExecution,
    /// Narrating the response.
    ResponseFormatting,
}

impl WorkflowStage {
    /// The wire name of the stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToolRetrieval => "tool_retrieval",
            Self::ToolContextGeneration => "tool_context_generation",
            Self::LlmSelection => "llm_selection",
            Self::ApiExecution => "api_execution",
            Self::ResponseFormatting => "response_formatting",
        }
    }
}

impl core::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    /// Success or error.
    pub status: WorkflowStatus,
    /// Tool the generated request was attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_tool: Option<String>,
    /// Request the model generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_spec: Option<HttpRequestSpec>,
    /// Response of the executed request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<HttpResponseSpec>,
    /// Narrated response, `None` when not asked for or when narration failed.
    #[serde(default)]
    pub formatted_response: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stage that failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_stage: Option<WorkflowStage>,
}

impl WorkflowResponse {
    /// A failed run.
    #[must_use]
    pub fn failed(stage: WorkflowStage, error: impl Into<String>) -> Self {
        Self {
            status: WorkflowStatus::Error,
            selected_tool: None,
            http_spec: None,
            raw_response: None,
            formatted_response: None,
            error: Some(error.into()),
            error_stage: Some(stage),
        }
    }

    /// Returns `true` for successful runs.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == WorkflowStatus::Success
    }
}
