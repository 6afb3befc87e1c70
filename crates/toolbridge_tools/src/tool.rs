//! The core [`Tool`] trait and the concrete tool variants.

use crate::api::ApiTool;
use crate::error::ToolError;
use crate::function::FunctionTool;
use crate::schema::ToolSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use toolbridge_models::llm;

/// Everything the registry and the LLM need to know about a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Description shown to the LLM.
    pub description: String,
    /// Schema of the arguments.
    pub input_schema: ToolSchema,
    /// Schema of the return value.
    pub output_schema: ToolSchema,
    /// Definition version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl ToolDefinition {
    /// Creates a definition with version 1 and no tags.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ToolSchema,
        output_schema: ToolSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema,
            version: default_version(),
            tags: Vec::new(),
        }
    }

    /// Projects onto the provider-agnostic LLM tool definition.
    #[must_use]
    pub fn to_llm_tool(&self) -> llm::ToolDefinition {
        llm::ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.input_schema.to_value(),
        }
    }

    /// Chat-Completions function format with strict mode enabled.
    #[must_use]
    pub fn to_openai_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema.to_value(),
                "strict": true,
            }
        })
    }
}

/// The capability set every registered tool exposes.
///
/// Implementors describe themselves through [`definition`](Tool::definition)
/// and run through [`execute`](Tool::execute). Arguments arrive already
/// validated against the input schema when called through the
/// [`ToolExecutor`](crate::ToolExecutor).
pub trait Tool: Send + Sync + 'static {
    /// Returns the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with JSON arguments.
    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>>;
}

/// The tool implementations the registry stores.
#[derive(Debug)]
pub enum ToolKind {
    /// Built from a declarative spec.
    ConfigBacked(ApiTool),
    /// Wraps a Rust handler.
    FunctionBacked(FunctionTool),
}

impl ToolKind {
    /// The underlying API tool, if config-backed.
    #[must_use]
    pub fn as_api_tool(&self) -> Option<&ApiTool> {
        match self {
            Self::ConfigBacked(tool) => Some(tool),
            Self::FunctionBacked(_) => None,
        }
    }
}

impl Tool for ToolKind {
    fn definition(&self) -> ToolDefinition {
        match self {
            Self::ConfigBacked(tool) => tool.definition(),
            Self::FunctionBacked(tool) => tool.definition(),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        match self {
            Self::ConfigBacked(tool) => tool.execute(args),
            Self::FunctionBacked(tool) => tool.execute(args),
        }
    }
}

impl From<ApiTool> for ToolKind {
    fn from(tool: ApiTool) -> Self {
        Self::ConfigBacked(tool)
    }
}

impl From<FunctionTool> for ToolKind {
    fn from(tool: FunctionTool) -> Self {
        Self::FunctionBacked(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{JsonType, PropertySchema};

    fn definition() -> ToolDefinition {
        ToolDefinition::new(
            "get_weather",
            "Current weather",
            ToolSchema::object().required_property("city", PropertySchema::new(JsonType::String)),
            ToolSchema::object(),
        )
    }

    #[test]
    fn llm_projection_carries_input_schema() {
        let tool = definition().to_llm_tool();
        assert_eq!(tool.name, "get_weather");
        assert_eq!(tool.parameters["required"], json!(["city"]));
        assert_eq!(tool.parameters["properties"]["city"]["type"], "string");
    }

    #[test]
    fn openai_projection_is_strict() {
        let tool = definition().to_openai_tool();
        assert_eq!(tool["type"], "function");
        assert_eq!(tool["function"]["name"], "get_weather");
        assert_eq!(tool["function"]["strict"], true);
    }
}
