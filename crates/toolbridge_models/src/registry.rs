//! Model provider registry.

use crate::error::CreateModelError;
use crate::llm::{Llm, LlmProvider};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for model provider implementations.
///
/// Access models using provider/model identifiers (e.g., `"openai/gpt-4o-mini"`).
/// See [`llm()`](Self::llm) for details.
///
/// Providers register themselves under a short name. Registration takes
/// `&self`, so a registry shared behind an [`Arc`] can still receive providers.
///
/// ```
/// # use toolbridge_models::ModelRegistry;
/// # use toolbridge_models::llm::{LlmProvider, GenerationRequest, GenerationResponse, GenerationError};
/// # use async_trait::async_trait;
/// # use std::sync::Arc;
/// # struct MyProvider;
/// # #[async_trait]
/// # impl LlmProvider for MyProvider {
/// #   async fn generate(&self, _model: &str, _request: GenerationRequest) -> Result<GenerationResponse, GenerationError> {
/// #     unimplemented!()
/// #   }
/// # }
/// let registry = ModelRegistry::new();
/// registry
///     .register_llm_provider("my_provider", Arc::new(MyProvider))
///     .expect("first registration succeeds");
///
/// let llm = registry.llm("my_provider/some-model").expect("provider is registered");
/// assert_eq!(llm.model_name(), "some-model");
/// ```
#[derive(Default)]
pub struct ModelRegistry {
    // Maps provider names to implementations.
    llm_providers: RwLock<HashMap<String, Arc<dyn LlmProvider>>>,
}

impl core::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("llm_providers", &self.llm_provider_names())
            .finish()
    }
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            llm_providers: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a handle to an [`Llm`].
    ///
    /// # Arguments
    ///
    /// * `model_id` - Identifier in `"provider/model"` format (e.g., `"openai/gpt-4o-mini"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the `model_id` structure is invalid or the provider is not registered.
    pub fn llm(&self, model_id: impl AsRef<str>) -> Result<Llm, CreateModelError> {
        let model_id = model_id.as_ref();

        let (provider_name, model_name) = model_id
            .split_once('/')
            .filter(|(provider, model)| !provider.is_empty() && !model.is_empty())
            .ok_or_else(|| CreateModelError::InvalidModelId(model_id.to_string()))?;

        let provider = self
            .get_llm_provider(provider_name)
            .ok_or_else(|| CreateModelError::UnknownProvider(provider_name.to_string()))?;

        Ok(Llm::new(provider, model_name.to_string()))
    }

    /// Registers an LLM provider.
    ///
    /// # Arguments
    ///
    /// * `name` - Provider name used in identifiers (e.g., `"openai"` for `"openai/gpt-4o-mini"`)
    /// * `provider` - The provider implementation
    ///
    /// # Errors
    ///
    /// Returns [`CreateModelError::DuplicateProvider`] if a provider with the
    /// same name is already registered.
    pub fn register_llm_provider<P: LlmProvider>(
        &self,
        name: impl Into<String>,
        provider: Arc<P>,
    ) -> Result<(), CreateModelError> {
        let name = name.into();
        let mut providers = self.llm_providers.write();
        if providers.contains_key(&name) {
            return Err(CreateModelError::DuplicateProvider(name));
        }
        providers.insert(name, provider as Arc<dyn LlmProvider>);
        Ok(())
    }

    /// Returns a provider by name.
    #[must_use]
    pub fn get_llm_provider(&self, name: impl AsRef<str>) -> Option<Arc<dyn LlmProvider>> {
        self.llm_providers.read().get(name.as_ref()).cloned()
    }

    /// Checks if a provider is registered.
    #[must_use]
    pub fn has_llm_provider(&self, name: impl AsRef<str>) -> bool {
        self.llm_providers.read().contains_key(name.as_ref())
    }

    /// Lists registered provider names.
    #[must_use]
    pub fn llm_provider_names(&self) -> Vec<String> {
        self.llm_providers.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerationError, GenerationRequest, GenerationResponse};
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl LlmProvider for NullProvider {
        async fn generate(
            &self,
            _model: &str,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, GenerationError> {
            Err(GenerationError::InvalidRequest("null provider".to_string()))
        }
    }

    #[test]
    fn resolves_provider_and_model() {
        let registry = ModelRegistry::new();
        registry
            .register_llm_provider("null", Arc::new(NullProvider))
            .expect("registration should succeed");

        let llm = registry.llm("null/model-a").expect("model should resolve");
        assert_eq!(llm.model_name(), "model-a");
        assert!(registry.has_llm_provider("null"));
    }

    #[test]
    fn rejects_malformed_model_ids() {
        let registry = ModelRegistry::new();
        registry
            .register_llm_provider("null", Arc::new(NullProvider))
            .expect("registration should succeed");

        for id in ["no-slash", "/model", "null/"] {
            let err = registry.llm(id).expect_err("id should be rejected");
            assert!(matches!(err, CreateModelError::InvalidModelId(_)), "{id}");
        }
    }

    #[test]
    fn unknown_provider_is_reported() {
        let registry = ModelRegistry::new();
        let err = registry.llm("missing/model").expect_err("provider is absent");
        assert!(matches!(err, CreateModelError::UnknownProvider(name) if name == "missing"));
    }

    #[test]
    fn duplicate_provider_is_rejected() {
        let registry = ModelRegistry::new();
        registry
            .register_llm_provider("null", Arc::new(NullProvider))
            .expect("first registration should succeed");
        let err = registry
            .register_llm_provider("null", Arc::new(NullProvider))
            .expect_err("second registration should fail");
        assert!(matches!(err, CreateModelError::DuplicateProvider(_)));
        assert_eq!(registry.llm_provider_names(), vec!["null".to_string()]);
    }
}
