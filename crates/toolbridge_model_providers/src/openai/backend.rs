//! Registration of the `OpenAI` provider with a [`ModelRegistry`].

use super::provider::OpenAiProvider;
use toolbridge_models::ModelRegistry;
use toolbridge_models::error::CreateModelError;
use toolbridge_models::llm::GenerationError;
use std::sync::Arc;

/// Provider name used in model identifiers (`"openai/<model>"`).
pub const PROVIDER_NAME: &str = "openai";

/// Configuration for the `OpenAI` backend.
///
/// ```ignore
/// OpenAiBackend::from_env("OPENAI_API_KEY")?.install(&registry)?;
/// ```
#[derive(Clone)]
pub struct OpenAiBackend {
    api_key: String,
    api_base: Option<String>,
}

impl core::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("api_key", &"***")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiBackend {
    /// Creates a backend with an explicit API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: None,
        }
    }

    /// Creates a backend that reads the API key from the specified environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Auth`] if the variable is unset or empty.
    pub fn from_env(env_var: &str) -> Result<Self, GenerationError> {
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(GenerationError::Auth(format!(
                "environment variable {env_var} is not set; it must hold an OpenAI API key"
            ))),
        }
    }

    /// Overrides the API base URL (e.g. for a proxy or a compatible server).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Builds the provider without registering it.
    #[must_use]
    pub fn provider(&self) -> OpenAiProvider {
        let provider = OpenAiProvider::new(self.api_key.clone());
        match &self.api_base {
            Some(base) => provider.with_api_base(base.clone()),
            None => provider,
        }
    }

    /// Registers the provider under [`PROVIDER_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`CreateModelError::DuplicateProvider`] if an `openai` provider
    /// is already registered.
    pub fn install(&self, registry: &ModelRegistry) -> Result<(), CreateModelError> {
        registry.register_llm_provider(PROVIDER_NAME, Arc::new(self.provider()))?;
        tracing::debug!(provider = PROVIDER_NAME, "registered LLM provider");
        Ok(())
    }
}
