//! # toolbridge Internal Library
//!
//! Re-exports the toolbridge crates for convenience.

/// Settings and tracing setup.
pub use toolbridge_core;

/// Outbound HTTP execution with retries.
pub use toolbridge_http;

/// LLM abstraction and model registry.
pub use toolbridge_models;

/// Model provider backends.
pub use toolbridge_model_providers;

/// Tool specifications, registry and executor.
pub use toolbridge_tools;

/// Tool-calling and workflow orchestration.
pub use toolbridge_orchestrator;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use toolbridge_core::{Settings, TracingConfig, TracingFormat};
    pub use toolbridge_http::{HttpClientService, HttpMethod, HttpRequestSpec, HttpResponseSpec, RetryPolicy};
    pub use toolbridge_models::ModelRegistry;
    pub use toolbridge_models::llm::{GenerationRequest, GenerationStream, Llm, StreamEvent};
    #[cfg(feature = "openai")]
    pub use toolbridge_model_providers::OpenAiBackend;
    pub use toolbridge_orchestrator::{
        AiOrchestrator, EngineContext, FlowDefinition, FlowOrchestrator, FlowResult, FlowStep,
        PromptService, SimpleToolGenerator, WorkflowOrchestrator, WorkflowRequest, WorkflowResponse,
        WorkflowStage, WorkflowStatus,
    };
    pub use toolbridge_tools::{
        ApiConfig, AuthConfig, FieldMapping, JsonType, PropertySchema, SimpleToolExecutor,
        SimpleToolSpec, Tool, ToolExecutor, ToolFactory, ToolRegistry, ToolResult, ToolSchema,
        ToolSpec, make_blocking_tool, make_tool, make_typed_tool,
    };
}
