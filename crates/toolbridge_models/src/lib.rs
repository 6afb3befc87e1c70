//! Model provider interface and registry for toolbridge.
//!
//! Provides a unified interface for AI model access, decoupling the tool
//! orchestration layers from provider implementations.
//!
//! # Overview
//!
//! - Provider-agnostic: the orchestrator depends only on this crate, not on a
//!   specific provider backend.
//!
//! - Runtime registration: provider crates register an [`LlmProvider`](llm::LlmProvider)
//!   under a name, allowing models to be swapped via configuration.
//!
//! # Example
//!
//! ```ignore
//! use toolbridge_models::ModelRegistry;
//! use toolbridge_models::llm::GenerationRequest;
//!
//! let registry = ModelRegistry::new();
//! registry.register_llm_provider("openai", Arc::new(provider))?;
//!
//! let llm = registry.llm("openai/gpt-4o-mini")?;
//! let request = GenerationRequest::with_system("You are helpful", "Hello!");
//! let response = llm.generate(request).await?;
//! ```

pub mod error;
pub mod llm;
mod registry;

pub use registry::ModelRegistry;
