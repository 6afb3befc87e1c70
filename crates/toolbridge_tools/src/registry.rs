//! Tool registry.
//!
//! The [`ToolRegistry`] is an explicit, shareable catalog mapping names to
//! tool implementations and their definitions. It is usually held in an
//! `Arc` and shared between the executor and the orchestrators.

use crate::error::RegistrationError;
use crate::tool::{Tool, ToolDefinition, ToolKind};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use toolbridge_models::llm;

/// A registry entry: the implementation and its definition.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    /// The implementation.
    pub tool: Arc<ToolKind>,
    /// The definition captured at registration.
    pub definition: ToolDefinition,
}

/// Registry of available tools.
///
/// Registration order is preserved in every listing.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<IndexMap<String, RegisteredTool>>,
}

impl core::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::AlreadyRegistered`] if the name is taken
    /// and [`RegistrationError::MissingCapability`] if the tool has an empty
    /// name or a non-object input schema.
    pub fn register(&self, tool: impl Into<ToolKind>) -> Result<(), RegistrationError> {
        let tool = tool.into();
        let definition = tool.definition();

        if definition.name.trim().is_empty() {
            return Err(RegistrationError::MissingCapability {
                name: definition.name,
                reason: "tool name is empty".to_string(),
            });
        }
        if !definition.input_schema.is_object() {
            return Err(RegistrationError::MissingCapability {
                name: definition.name,
                reason: format!(
                    "input schema must describe an object, got {}",
                    definition.input_schema.kind
                ),
            });
        }

        let mut tools = self.tools.write();
        if tools.contains_key(&definition.name) {
            return Err(RegistrationError::AlreadyRegistered(definition.name));
        }

        tracing::info!(tool = %definition.name, "registered tool");
        tools.insert(
            definition.name.clone(),
            RegisteredTool {
                tool: Arc::new(tool),
                definition,
            },
        );
        Ok(())
    }

    /// Removes a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotFound`] if no such tool exists.
    pub fn unregister(&self, name: &str) -> Result<RegisteredTool, RegistrationError> {
        let removed = self.tools.write().shift_remove(name);
        match removed {
            Some(entry) => {
                tracing::info!(tool = name, "unregistered tool");
                Ok(entry)
            }
            None => Err(RegistrationError::NotFound(name.to_string())),
        }
    }

    /// Looks up a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotFound`] if no such tool exists.
    pub fn get(&self, name: &str) -> Result<RegisteredTool, RegistrationError> {
        self.tools
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistrationError::NotFound(name.to_string()))
    }

    /// Looks up a tool's definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotFound`] if no such tool exists.
    pub fn get_definition(&self, name: &str) -> Result<ToolDefinition, RegistrationError> {
        self.get(name).map(|entry| entry.definition)
    }

    /// Looks up several tools at once.
    ///
    /// Returns `(found, missing)`. Names are deduplicated keeping the first
    /// occurrence, so the two lists partition the requested set exactly.
    pub fn get_multiple<S: AsRef<str>>(&self, names: &[S]) -> (Vec<RegisteredTool>, Vec<String>) {
        let requested: IndexSet<&str> = names.iter().map(|name| name.as_ref()).collect();
        let tools = self.tools.read();

        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in requested {
            match tools.get(name) {
                Some(entry) => found.push(entry.clone()),
                None => missing.push(name.to_string()),
            }
        }
        (found, missing)
    }

    /// A new registry sharing the named tools with this one.
    ///
    /// Returns the registry and the names that were not found.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> (Self, Vec<String>) {
        let (found, missing) = self.get_multiple(names);
        let tools = found
            .into_iter()
            .map(|entry| (entry.definition.name.clone(), entry))
            .collect();
        (
            Self {
                tools: RwLock::new(tools),
            },
            missing,
        )
    }

    /// Names of all registered tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    /// Definitions of all registered tools.
    #[must_use]
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .values()
            .map(|entry| entry.definition.clone())
            .collect()
    }

    /// All tools in the provider-agnostic LLM format.
    #[must_use]
    pub fn to_llm_tool_format(&self) -> Vec<llm::ToolDefinition> {
        self.tools
            .read()
            .values()
            .map(|entry| entry.definition.to_llm_tool())
            .collect()
    }

    /// All tools in the Chat-Completions function format.
    #[must_use]
    pub fn to_openai_tools(&self) -> Vec<Value> {
        self.tools
            .read()
            .values()
            .map(|entry| entry.definition.to_openai_tool())
            .collect()
    }

    /// Returns whether a tool with the given name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Removes every tool.
    pub fn clear(&self) {
        self.tools.write().clear();
    }
}
