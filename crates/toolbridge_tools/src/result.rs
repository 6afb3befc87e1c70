//! The structured outcome of a tool execution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one [`ToolExecutor::execute`](crate::ToolExecutor::execute) call.
///
/// Exactly one of `data` and `error` is set, matching `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name the caller asked for.
    pub tool_name: String,
    /// Whether the tool produced data.
    pub success: bool,
    /// Tool output on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration of the execution.
    pub execution_time_ms: f64,
}

impl ToolResult {
    /// A successful result.
    pub fn success(tool_name: impl Into<String>, data: Value, execution_time_ms: f64) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            data: Some(data),
            error: None,
            execution_time_ms: execution_time_ms.max(0.0),
        }
    }

    /// A failed result.
    pub fn failure(
        tool_name: impl Into<String>,
        error: impl Into<String>,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            data: None,
            error: Some(error.into()),
            execution_time_ms: execution_time_ms.max(0.0),
        }
    }

    /// Text sent back to an LLM as the tool's output.
    #[must_use]
    pub fn to_llm_output(&self) -> String {
        match (&self.data, &self.error) {
            (Some(data), _) => data.to_string(),
            (None, Some(error)) => format!("Error: {error}"),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_and_error_are_exclusive() {
        let ok = ToolResult::success("t", json!({"x": 1}), 1.5);
        assert!(ok.success && ok.error.is_none());
        assert_eq!(ok.to_llm_output(), r#"{"x":1}"#);

        let failed = ToolResult::failure("t", "boom", -1.0);
        assert!(!failed.success && failed.data.is_none());
        assert_eq!(failed.execution_time_ms, 0.0);
        assert_eq!(failed.to_llm_output(), "Error: boom");
    }

    #[test]
    fn serializes_without_empty_side() {
        let value = serde_json::to_value(ToolResult::failure("t", "boom", 2.0)).unwrap();
        assert_eq!(
            value,
            json!({"tool_name": "t", "success": false, "error": "boom", "execution_time_ms": 2.0})
        );
    }
}
