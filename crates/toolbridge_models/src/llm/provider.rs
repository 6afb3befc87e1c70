//! The [`LlmProvider`] trait for LLM model providers.

use super::error::GenerationError;
use super::stream::{GenerationStream, replay};
use super::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;

/// Trait implemented by LLM providers for text generation.
///
/// Provider backends implement this trait to handle generation requests.
#[async_trait]
pub trait LlmProvider: Send + Sync + 'static {
    /// Sends a generation request to the provider.
    ///
    /// # Arguments
    ///
    /// * `model` - The model name on which to perform generation
    /// * `request` - The generation request
    async fn generate(
        &self,
        model: &str,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Streams a generation request as [`StreamEvent`](super::StreamEvent)s.
    ///
    /// The default implementation waits for [`generate`](Self::generate)
    /// and replays the finished response. Providers with incremental
    /// output override it.
    async fn stream(
        &self,
        model: &str,
        request: GenerationRequest,
    ) -> Result<GenerationStream, GenerationError> {
        let response = self.generate(model, request).await?;
        Ok(replay(response))
    }
}
