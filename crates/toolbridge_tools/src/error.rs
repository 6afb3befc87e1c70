//! Error types for tool registration, validation and execution.

use thiserror::Error;
use toolbridge_http::HttpError;

/// Errors that can occur during tool execution.
///
/// The [`ToolExecutor`](crate::ToolExecutor) converts every variant into a
/// failed [`ToolResult`](crate::ToolResult); none of them reach its caller.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema.
    #[error("Input validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error during parameter deserialization or parsing.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error raised by the tool implementation.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The tool is not registered.
    #[error("Tool '{0}' not found")]
    NotFound(String),

    /// The tool specification cannot be executed as configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The HTTP call failed after exhausting retries.
    #[error("Execution error: {0}")]
    Http(#[from] HttpError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ToolError {
    /// Creates a [`ParameterError`](Self::ParameterError).
    pub fn parameter_error(msg: impl Into<String>) -> Self {
        Self::ParameterError(msg.into())
    }

    /// Creates an [`ExecutionError`](Self::ExecutionError).
    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Creates a [`Configuration`](Self::Configuration) error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Schema mismatch found by the structural validator.
///
/// Collects every problem found in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .problems.join("; "))]
pub struct ValidationError {
    /// Individual problems, in schema order.
    pub problems: Vec<String>,
}

impl ValidationError {
    /// Creates an error with a single problem.
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problems: vec![problem.into()],
        }
    }
}

/// Errors raised by [`ToolRegistry`](crate::ToolRegistry) mutations and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A tool with this name is already registered.
    #[error("Tool '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No tool with this name is registered.
    #[error("Tool '{0}' not found")]
    NotFound(String),

    /// The tool does not expose the required capability set.
    #[error("Tool '{name}' cannot be registered: {reason}")]
    MissingCapability {
        /// Offending tool name (may be empty).
        name: String,
        /// What is missing.
        reason: String,
    },
}
