//! Shared dependencies for the orchestrators.

use crate::ai::AiOrchestrator;
use crate::flow::FlowOrchestrator;
use crate::generator::SimpleToolGenerator;
use crate::prompt::PromptService;
use crate::workflow::WorkflowOrchestrator;
use std::sync::Arc;
use toolbridge_core::Settings;
use toolbridge_http::{HttpClientService, RetryPolicy};
use toolbridge_models::ModelRegistry;
use toolbridge_models::error::CreateModelError;
use toolbridge_models::llm::Llm;
use toolbridge_tools::{SimpleToolExecutor, ToolExecutor, ToolFactory, ToolRegistry};

/// The registry, HTTP client and model every component is built from.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Debug, Clone)]
pub struct EngineContext {
    registry: Arc<ToolRegistry>,
    http: HttpClientService,
    llm: Llm,
    llm_retry: Option<RetryPolicy>,
}

impl EngineContext {
    /// Creates a context with an empty registry.
    #[must_use]
    pub fn new(http: HttpClientService, llm: Llm) -> Self {
        Self {
            registry: Arc::new(ToolRegistry::new()),
            http,
            llm,
            llm_retry: None,
        }
    }

    /// Builds a context from settings, resolving `llm_model` in `models`.
    ///
    /// # Errors
    ///
    /// Returns [`CreateModelError`] if the model's provider is not
    /// registered.
    pub fn from_settings(settings: &Settings, models: &ModelRegistry) -> Result<Self, CreateModelError> {
        let llm = models.llm(&settings.llm_model)?;
        let http = HttpClientService::new(settings.http_timeout, settings.retry_policy());
        tracing::info!(
            app = %settings.app_name,
            model = %settings.llm_model,
            timeout_secs = settings.http_timeout.as_secs_f64(),
            "engine context created"
        );
        Ok(Self::new(http, llm).with_llm_retry_policy(settings.llm_retry_policy()))
    }

    /// Uses a shared registry instead of the context's own.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the retry policy for prompt calls.
    #[must_use]
    pub fn with_llm_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.llm_retry = Some(retry);
        self
    }

    /// The shared tool registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// The HTTP client.
    #[must_use]
    pub fn http(&self) -> &HttpClientService {
        &self.http
    }

    /// The model handle.
    #[must_use]
    pub fn llm(&self) -> &Llm {
        &self.llm
    }

    /// A factory whose tools use this context's HTTP client.
    #[must_use]
    pub fn tool_factory(&self) -> ToolFactory {
        ToolFactory::new(self.http.clone())
    }

    /// An executor over the registry.
    #[must_use]
    pub fn tool_executor(&self) -> ToolExecutor {
        ToolExecutor::new(Arc::clone(&self.registry))
    }

    /// A prompt service on this context's model.
    #[must_use]
    pub fn prompt_service(&self) -> PromptService {
        let service = PromptService::new(self.llm.clone());
        match &self.llm_retry {
            Some(retry) => service.with_retry_policy(retry.clone()),
            None => service,
        }
    }

    /// A tool-calling orchestrator over the registry.
    #[must_use]
    pub fn ai_orchestrator(&self) -> AiOrchestrator {
        AiOrchestrator::new(self.llm.clone(), Arc::clone(&self.registry))
    }

    /// A workflow orchestrator over the registry.
    #[must_use]
    pub fn workflow_orchestrator(&self) -> WorkflowOrchestrator {
        WorkflowOrchestrator::new(Arc::clone(&self.registry), self.prompt_service(), self.http.clone())
    }

    /// A flow runner drawing step tools from the registry.
    #[must_use]
    pub fn flow_orchestrator(&self) -> FlowOrchestrator {
        FlowOrchestrator::new(self.llm.clone(), Arc::clone(&self.registry))
    }

    /// A generator of simple tool specs from API docs.
    #[must_use]
    pub fn simple_tool_generator(&self) -> SimpleToolGenerator {
        SimpleToolGenerator::new(self.prompt_service())
    }

    /// An executor for simple tool specs on this context's HTTP client.
    #[must_use]
    pub fn simple_tool_executor(&self) -> SimpleToolExecutor {
        SimpleToolExecutor::new(self.http.clone())
    }
}
