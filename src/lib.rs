//! Dynamic tool execution and orchestration for LLM applications.
//!
//! Tools are declared as data ([`ToolSpec`](toolbridge_tools::ToolSpec)) or as
//! plain functions, collected in a registry, and driven by either an LLM
//! function-calling loop or a workflow in which the model writes the HTTP
//! request itself.

pub use toolbridge_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use toolbridge_internal::prelude::*;
}
