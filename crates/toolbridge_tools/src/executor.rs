//! Validating, never-failing tool dispatch.

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::result::ToolResult;
use crate::schema::{check_output, validate_input};
use crate::tool::Tool;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Executes registered tools and reports every outcome as a [`ToolResult`].
///
/// Lookup misses, invalid arguments, tool errors and panics all become
/// failed results; [`execute`](Self::execute) has no error path.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Creates an executor over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this executor dispatches into.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Executes `tool_name` with `arguments`.
    pub async fn execute(&self, tool_name: &str, arguments: Value) -> ToolResult {
        let start = Instant::now();
        let outcome = AssertUnwindSafe(self.run(tool_name, arguments))
            .catch_unwind()
            .await;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(Ok(data)) => {
                tracing::info!(tool = tool_name, elapsed_ms = elapsed, "tool succeeded");
                ToolResult::success(tool_name, data, elapsed)
            }
            Ok(Err(err)) => {
                tracing::warn!(tool = tool_name, elapsed_ms = elapsed, error = %err, "tool failed");
                ToolResult::failure(tool_name, err.to_string(), elapsed)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = tool_name, elapsed_ms = elapsed, panic = %message, "tool panicked");
                ToolResult::failure(tool_name, format!("Unexpected error: {message}"), elapsed)
            }
        }
    }

    async fn run(&self, tool_name: &str, arguments: Value) -> Result<Value, ToolError> {
        let entry = self
            .registry
            .get(tool_name)
            .map_err(|_| ToolError::NotFound(tool_name.to_string()))?;

        let validated = validate_input(&entry.definition.input_schema, &arguments)?;
        tracing::debug!(tool = tool_name, fields = validated.len(), "arguments validated");

        let output = entry.tool.execute(Value::Object(validated)).await?;

        if let Some(mismatch) = check_output(&entry.definition.output_schema, &output) {
            tracing::warn!(tool = tool_name, mismatch = %mismatch, "output does not match schema");
        }
        Ok(output)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{make_blocking_tool, make_tool};
    use crate::schema::{JsonType, PropertySchema, ToolSchema};
    use serde_json::json;

    async fn explode(_call: crate::FunctionCall) -> Result<Value, ToolError> {
        panic!("kaboom")
    }

    fn executor() -> ToolExecutor {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register(make_tool(
                "double",
                "Doubles a number",
                ToolSchema::object().required_property("n", PropertySchema::new(JsonType::Integer)),
                ToolSchema::object(),
                |call| async move {
                    let n: i64 = call.get_param("n")?;
                    Ok(json!({"result": n * 2}))
                },
            ))
            .unwrap();
        registry
            .register(make_tool("fail", "Fails", ToolSchema::object(), ToolSchema::object(), |_| async {
                Err(ToolError::execution_error("backend unavailable"))
            }))
            .unwrap();
        registry
            .register(make_tool("panic", "Panics", ToolSchema::object(), ToolSchema::object(), explode))
            .unwrap();
        registry
            .register(make_blocking_tool(
                "blocking_panic",
                "Panics on the blocking pool",
                ToolSchema::object(),
                ToolSchema::object(),
                |_| panic!("blocking kaboom"),
            ))
            .unwrap();
        registry
            .register(make_tool("list", "Returns a list", ToolSchema::object(), ToolSchema::object(), |_| async {
                Ok(json!([1, 2]))
            }))
            .unwrap();
        ToolExecutor::new(registry)
    }

    #[tokio::test]
    async fn success_with_timing() {
        let result = executor().execute("double", json!({"n": 21})).await;
        assert!(result.success);
        assert_eq!(result.data, Some(json!({"result": 42})));
        assert!(result.execution_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn unknown_tool() {
        let result = executor().execute("nope", json!({})).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Tool 'nope' not found"));
    }

    #[tokio::test]
    async fn invalid_arguments() {
        let result = executor().execute("double", json!({"n": "x"})).await;
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("Input validation error:"), "{error}");
    }

    #[tokio::test]
    async fn failing_tool() {
        let result = executor().execute("fail", json!({})).await;
        assert_eq!(result.error.as_deref(), Some("Execution error: backend unavailable"));
        assert!(result.data.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panics_are_contained() {
        let executor = executor();
        let result = executor.execute("panic", json!({})).await;
        assert_eq!(result.error.as_deref(), Some("Unexpected error: kaboom"));

        let result = executor.execute("blocking_panic", json!({})).await;
        assert_eq!(result.error.as_deref(), Some("Unexpected error: blocking kaboom"));
    }

    #[tokio::test]
    async fn output_mismatch_only_warns() {
        let result = executor().execute("list", Value::Null).await;
        assert!(result.success);
        assert_eq!(result.data, Some(json!([1, 2])));
    }
}
