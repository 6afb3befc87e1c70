//! LLM handle for generation requests.

use super::error::{ExtractionError, GenerationError};
use super::provider::LlmProvider;
use super::stream::GenerationStream;
use super::types::{GenerationRequest, GenerationResponse};
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// An LLM handle for making generation requests.
///
/// Created via [`ModelRegistry::llm()`](crate::ModelRegistry::llm), or directly
/// from a provider with [`Llm::new`].
#[derive(Clone)]
pub struct Llm {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl core::fmt::Debug for Llm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Llm").field("model", &self.model).finish()
    }
}

impl Llm {
    /// Creates a new LLM handle from provider and model name.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Sends a generation request to the model.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the request fails.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.provider.generate(&self.model, request).await
    }

    /// Streams a generation request.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the stream cannot be opened. Errors
    /// after that arrive as stream items.
    pub async fn stream(&self, request: GenerationRequest) -> Result<GenerationStream, GenerationError> {
        self.provider.stream(&self.model, request).await
    }

    /// Sends a generation request with structured output.
    ///
    /// This method automatically injects the JSON schema for type `T` into the request
    /// and parses the response into the specified type.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if:
    /// - The generation request fails
    /// - No text content is found in the response
    /// - The response cannot be parsed as type `T`
    pub async fn generate_structured<T: JsonSchema + DeserializeOwned>(
        &self,
        request: GenerationRequest,
    ) -> Result<T, ExtractionError> {
        let schema = serde_json::to_value(schema_for!(T))
            .map_err(|err| ExtractionError::SchemaSerializationError(err.to_string()))?;

        let value = self.generate_structured_value(request, schema).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sends a generation request constrained by a raw JSON schema.
    ///
    /// Returns the parsed JSON document without binding it to a Rust type.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if the request fails, the response has
    /// no text content, or the text is not valid JSON.
    pub async fn generate_structured_value(
        &self,
        mut request: GenerationRequest,
        schema: Value,
    ) -> Result<Value, ExtractionError> {
        request.output_schema = Some(schema);

        let response = self.generate(request).await?;

        let text = response.text();
        if text.is_empty() {
            return Err(ExtractionError::NoContent);
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Returns the model name (without provider prefix).
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model
    }
}
