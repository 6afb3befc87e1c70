//! LLM (Large Language Model) generation capabilities.
//!
//! This module provides the core traits and types for text generation
//! with LLMs, including support for:
//!
//! - Text generation with tool calling
//! - Structured outputs
//! - Event streams

mod error;
mod model;
mod provider;
mod stream;
mod types;

pub use error::{ExtractionError, GenerationError};
pub use model::Llm;
pub use provider::LlmProvider;
pub use stream::{GenerationStream, StreamEvent, replay};
pub use types::{
    AssistantBlock, GenerationRequest, GenerationResponse, Message, ReasoningBlock, TextBlock,
    ToolCall, ToolChoice, ToolDefinition, ToolFunction, ToolResult, ToolResultStatus, Usage,
    UserBlock,
};
