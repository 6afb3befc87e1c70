//! Prompt templates and the prompting service.
//!
//! Two modes exist: *normal* asks for free text, *MCP* asks the model to
//! emit an HTTP request specification for a described API.

mod service;
mod templates;

pub use service::{
    GeneratedHttpRequest, KeyValue, McpPromptRequest, PromptError, PromptKind, PromptRequest,
    PromptResponse, PromptService,
};
pub use templates::PromptTemplates;
