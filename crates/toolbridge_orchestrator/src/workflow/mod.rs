//! Five-stage workflow: from user instructions to an executed API call.

mod context;
mod matcher;
mod types;

pub use context::render_tool_context;
pub use matcher::{ToolMatcher, UNKNOWN_TOOL, UrlKeywordMatcher};
pub use types::{WorkflowRequest, WorkflowResponse, WorkflowStage, WorkflowStatus};

use crate::prompt::{McpPromptRequest, PromptError, PromptRequest, PromptService};
use serde_json::Value;
use std::sync::Arc;
use toolbridge_http::{HttpClientService, HttpRequestSpec, HttpResponseSpec};
use toolbridge_tools::{RegisteredTool, ToolRegistry};

/// Runs workflow requests against a registry.
///
/// Stages run in order: tool retrieval, tool context generation, LLM
/// selection, API execution and optional response formatting. A failing
/// stage ends the run with a [`WorkflowResponse`] tagged with that stage;
/// [`execute`](Self::execute) itself never fails. Formatting failures are
/// not fatal.
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    registry: Arc<ToolRegistry>,
    prompts: PromptService,
    http: HttpClientService,
    matcher: Arc<dyn ToolMatcher>,
}

impl core::fmt::Debug for WorkflowOrchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkflowOrchestrator")
            .field("tools", &self.registry.len())
            .field("prompts", &self.prompts)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl WorkflowOrchestrator {
    /// Creates an orchestrator using [`UrlKeywordMatcher`].
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, prompts: PromptService, http: HttpClientService) -> Self {
        tracing::info!("workflow orchestrator initialized");
        Self {
            registry,
            prompts,
            http,
            matcher: Arc::new(UrlKeywordMatcher),
        }
    }

    /// Replaces the tool matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl ToolMatcher) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Runs the workflow for `request`.
    pub async fn execute(&self, request: &WorkflowRequest) -> WorkflowResponse {
        tracing::info!(
            instructions = %preview(&request.user_instructions),
            tools = request.tool_ids.len(),
            "starting workflow"
        );

        let tools = match self.retrieve_tools(&request.tool_ids) {
            Ok(tools) => tools,
            Err(error) => return fail(WorkflowStage::ToolRetrieval, error),
        };

        let context = render_tool_context(&tools);

        let (http_spec, selected_tool) = match self.select(request, &context, &tools).await {
            Ok(selection) => selection,
            Err(err) => {
                return fail(WorkflowStage::LlmSelection, format!("LLM selection error: {err}"));
            }
        };

        let outgoing = authenticate(&http_spec, &selected_tool, &tools);
        tracing::info!(method = %http_spec.method, url = %http_spec.url, "executing API call");
        let raw_response = match self.http.execute(&outgoing).await {
            Ok(response) => response,
            Err(err) => {
                return fail(WorkflowStage::ApiExecution, format!("API execution error: {err}"));
            }
        };
        tracing::info!(status = raw_response.status_code, "API call completed");

        let formatted_response = if request.format_response {
            self.format(request, &raw_response).await
        } else {
            None
        };

        tracing::info!(tool = %selected_tool, "workflow completed");
        WorkflowResponse {
            status: WorkflowStatus::Success,
            selected_tool: Some(selected_tool),
            http_spec: Some(http_spec),
            raw_response: Some(raw_response),
            formatted_response,
            error: None,
            error_stage: None,
        }
    }

    fn retrieve_tools(&self, tool_ids: &[String]) -> Result<Vec<RegisteredTool>, String> {
        let (found, missing) = self.registry.get_multiple(tool_ids);
        if missing.is_empty() {
            tracing::info!(count = found.len(), "retrieved tools");
            Ok(found)
        } else {
            Err(format!("Tools not found in registry: {missing:?}"))
        }
    }

    async fn select(
        &self,
        request: &WorkflowRequest,
        context: &str,
        tools: &[RegisteredTool],
    ) -> Result<(HttpRequestSpec, String), PromptError> {
        tracing::info!("asking model for an HTTP request");
        let prompt = McpPromptRequest::new(request.user_instructions.clone(), context);
        let http_spec = self.prompts.prompt_mcp(&prompt).await?.http_spec()?;

        let candidates: Vec<String> = tools.iter().map(|tool| tool.definition.name.clone()).collect();
        let selected = self.matcher.match_tool(&http_spec, &candidates);
        tracing::info!(tool = %selected, "identified selected tool");
        Ok((http_spec, selected))
    }

    async fn format(&self, request: &WorkflowRequest, response: &HttpResponseSpec) -> Option<String> {
        let body = match &response.body {
            None | Some(Value::Null) => "No response body".to_string(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };

        let mut prompt = PromptRequest::new(format!(
            "Format this API response in a human-readable way: {body}"
        ))
        .with_context(format!("Original user request: {}", request.user_instructions));
        prompt.response_format_prompt = request.response_format_instructions.clone();

        tracing::info!("formatting API response");
        let formatted = self
            .prompts
            .prompt_normal(&prompt)
            .await
            .and_then(|reply| reply.text().map(str::to_string));
        match formatted {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(
                    stage = %WorkflowStage::ResponseFormatting,
                    error = %err,
                    "response formatting failed, continuing without it"
                );
                None
            }
        }
    }
}

/// The request actually sent: the model's request plus the selected
/// config-backed tool's credential, when it targets that tool's origin.
/// The returned copy never leaves the orchestrator.
fn authenticate(http_spec: &HttpRequestSpec, selected: &str, tools: &[RegisteredTool]) -> HttpRequestSpec {
    let mut outgoing = http_spec.clone();
    if let Some(api) = tools
        .iter()
        .find(|tool| tool.definition.name == selected)
        .and_then(|tool| tool.tool.as_api_tool())
    {
        api.apply_credentials(&mut outgoing);
    }
    outgoing
}

fn fail(stage: WorkflowStage, error: String) -> WorkflowResponse {
    tracing::error!(stage = %stage, error = %error, "workflow failed");
    WorkflowResponse::failed(stage, error)
}

fn preview(text: &str) -> &str {
    text.char_indices().nth(50).map_or(text, |(idx, _)| &text[..idx])
}
