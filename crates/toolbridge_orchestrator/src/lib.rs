//! Orchestration layer for toolbridge.
//!
//! Two orchestrators sit on top of the tool layer:
//!
//! - [`AiOrchestrator`] sends user input plus the registry's tool catalog
//!   to an LLM and executes the function calls it asks for.
//! - [`WorkflowOrchestrator`] runs the five-stage pipeline: retrieve tools,
//!   render them as context, let the LLM write an HTTP request, execute it,
//!   and optionally have the LLM narrate the result. Every failure is
//!   reported as a tagged [`WorkflowResponse`].
//!
//! [`FlowOrchestrator`] chains tool-calling runs into multi-step flows,
//! and [`SimpleToolGenerator`] drafts simple tool specs from API docs.
//!
//! [`PromptService`] provides the prompting modes they rely on, and
//! [`EngineContext`] bundles the shared dependencies.

mod ai;
mod engine;
pub mod flow;
mod generator;
pub mod prompt;
pub mod workflow;

pub use ai::{AiOrchestrator, DEFAULT_MAX_TOOL_ITERATIONS, OrchestratorOutput, RunInput, ToolCallOutcome};
pub use engine::EngineContext;
pub use flow::{FlowDefinition, FlowOrchestrator, FlowResult, FlowStep, FlowStepKind};
pub use generator::{
    API_KEY_PLACEHOLDER, GeneratorError, SimpleToolGenerator, normalize_key_header, static_headers,
};
pub use prompt::{
    GeneratedHttpRequest, KeyValue, McpPromptRequest, PromptError, PromptKind, PromptRequest,
    PromptResponse, PromptService, PromptTemplates,
};
pub use workflow::{
    ToolMatcher, UrlKeywordMatcher, WorkflowOrchestrator, WorkflowRequest, WorkflowResponse,
    WorkflowStage, WorkflowStatus,
};
