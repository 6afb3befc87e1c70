//! Tool layer for toolbridge.
//!
//! This crate turns declarative API descriptions ([`ToolSpec`]) and plain Rust
//! functions into tools an LLM can call, stores them in a [`ToolRegistry`],
//! and runs them through a [`ToolExecutor`] that always produces a structured
//! [`ToolResult`].
//!
//! # Quick Start
//!
//! ```ignore
//! use toolbridge_tools::{ToolFactory, ToolRegistry, ToolExecutor, example_stock_quote_spec};
//!
//! let registry = Arc::new(ToolRegistry::new());
//! let factory = ToolFactory::new(http_client);
//! factory.register_config_tool(&registry, example_stock_quote_spec())?;
//!
//! let executor = ToolExecutor::new(registry.clone());
//! let result = executor.execute("get_stock_quote", json!({"symbol": "IBM"})).await;
//! ```
//!
//! # Architecture
//!
//! - [`ToolSpec`]: declarative API tool configuration
//! - [`ApiTool`]: executes a [`ToolSpec`] against its HTTP endpoint
//! - [`FunctionTool`]: wraps a Rust handler ([`make_tool`], [`make_typed_tool`])
//! - [`Tool`] / [`ToolKind`]: capability set and the concrete tool variants
//! - [`ToolSchema`]: typed schema with a single structural validator
//! - [`ToolRegistry`]: named catalog with partial batch lookup
//! - [`ToolExecutor`]: validation, dispatch and timing
//! - [`ToolFactory`]: loads specs from values, strings and files
//! - [`SimpleToolExecutor`]: minimal URL-based tools

pub mod api;
pub mod error;
pub mod executor;
pub mod factory;
pub mod function;
pub mod param;
pub mod registry;
pub mod result;
pub mod schema;
pub mod secret;
pub mod simple;
pub mod spec;
pub mod tool;

// Re-export core types at crate root.
pub use api::ApiTool;
pub use error::{RegistrationError, ToolError, ValidationError};
pub use executor::ToolExecutor;
pub use factory::{FactoryError, ToolFactory, example_stock_quote_spec};
pub use function::{FunctionTool, make_blocking_tool, make_tool, make_typed_tool};
pub use param::FunctionCall;
pub use registry::{RegisteredTool, ToolRegistry};
pub use result::ToolResult;
pub use schema::{JsonType, PropertySchema, ToolSchema, TypeSpec};
pub use simple::{SimpleToolExecutor, SimpleToolSpec};
pub use spec::{ApiConfig, ApiMethod, AuthConfig, AuthMethod, FieldMapping, ToolSpec};
pub use tool::{Tool, ToolDefinition, ToolKind};
