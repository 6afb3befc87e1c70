//! Model provider backends for toolbridge.
//!
//! Each backend implements [`LlmProvider`](toolbridge_models::llm::LlmProvider) and
//! registers itself with a [`ModelRegistry`](toolbridge_models::ModelRegistry),
//! allowing the orchestrator to address models as `"provider/model"`.
//!
//! # Supported Providers
//!
//! | Provider | Feature Flag | Description |
//! |----------|--------------|-------------|
//! | `OpenAI` | `openai` (default) | `OpenAI` Responses API |
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "openai")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use toolbridge_model_providers::OpenAiBackend;
//! use toolbridge_models::ModelRegistry;
//!
//! let registry = ModelRegistry::new();
//! OpenAiBackend::from_env("OPENAI_API_KEY")?.install(&registry)?;
//! let llm = registry.llm("openai/gpt-4o-mini")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "openai"))]
//! # fn main() {}
//! ```

mod schema;

pub use schema::normalize_schema_for_strict_mode;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiBackend;
