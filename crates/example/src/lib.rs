//! Example workflow runner built with toolbridge.
//!
//! Wires settings, the `OpenAI` provider and a tool registry into an
//! [`EngineContext`], registers two tools and runs one request either as a
//! five-stage workflow or through LLM function calling.

pub mod tools;

use toolbridge_core::{ConfigError, Settings};
use toolbridge_model_providers::OpenAiBackend;
use toolbridge_models::ModelRegistry;
use toolbridge_models::error::CreateModelError;
use toolbridge_orchestrator::EngineContext;
use toolbridge_tools::{FactoryError, RegistrationError, ToolError, example_stock_quote_spec};

/// Errors raised while assembling the demo engine.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Settings were missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The model could not be resolved.
    #[error(transparent)]
    Model(#[from] CreateModelError),
    /// A config-backed tool was rejected.
    #[error(transparent)]
    Factory(#[from] FactoryError),
    /// A function tool could not be built.
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// A function tool could not be registered.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Builds the engine and registers `get_stock_quote` and `text_stats`.
///
/// # Errors
///
/// Returns [`SetupError`] if the API key is missing or a tool is rejected.
pub fn build_engine(settings: &Settings) -> Result<EngineContext, SetupError> {
    let models = ModelRegistry::new();
    OpenAiBackend::new(settings.require_openai_api_key()?).install(&models)?;

    let engine = EngineContext::from_settings(settings, &models)?;
    engine
        .tool_factory()
        .register_config_tool(engine.registry(), example_stock_quote_spec())?;
    engine.registry().register(tools::text_stats_tool()?)?;

    tracing::info!(tools = ?engine.registry().list_tools(), "demo tools registered");
    Ok(engine)
}
