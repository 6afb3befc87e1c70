//! Tools backed by Rust functions.
//!
//! Three builders cover the calling conventions:
//!
//! - [`make_tool`]: async handler reading named parameters from a
//!   [`FunctionCall`]
//! - [`make_blocking_tool`]: synchronous handler run on the blocking pool
//! - [`make_typed_tool`]: handler taking one deserialized input struct, with
//!   both schemas derived through `schemars`

use crate::error::ToolError;
use crate::param::FunctionCall;
use crate::schema::ToolSchema;
use crate::tool::{Tool, ToolDefinition};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;
type AsyncHandler = Arc<dyn Fn(FunctionCall) -> BoxFuture + Send + Sync>;
type BlockingHandler = Arc<dyn Fn(FunctionCall) -> Result<Value, ToolError> + Send + Sync>;

enum Handler {
    Async(AsyncHandler),
    Blocking(BlockingHandler),
}

/// A tool whose behavior is a Rust closure.
pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Handler,
}

impl core::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match self.handler {
            Handler::Async(_) => "async",
            Handler::Blocking(_) => "blocking",
        };
        f.debug_struct("FunctionTool")
            .field("name", &self.definition.name)
            .field("handler", &kind)
            .finish()
    }
}

impl FunctionTool {
    /// Tags attached to the definition.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        let call = match FunctionCall::from_value(self.definition.name.clone(), args) {
            Ok(call) => call,
            Err(err) => return Box::pin(async move { Err(err) }),
        };

        match &self.handler {
            Handler::Async(handler) => handler(call),
            Handler::Blocking(handler) => {
                let handler = Arc::clone(handler);
                Box::pin(async move {
                    tokio::task::spawn_blocking(move || handler(call))
                        .await
                        .map_err(|err| {
                            if err.is_panic() {
                                std::panic::resume_unwind(err.into_panic())
                            }
                            ToolError::execution_error(format!("blocking task cancelled: {err}"))
                        })?
                })
            }
        }
    }
}

/// Creates a tool from an async handler.
///
/// The handler receives the validated arguments as a [`FunctionCall`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use toolbridge_tools::{JsonType, PropertySchema, ToolSchema, make_tool};
///
/// let echo = make_tool(
///     "echo",
///     "Echo a message",
///     ToolSchema::object().required_property("message", PropertySchema::new(JsonType::String)),
///     ToolSchema::object(),
///     |call| async move {
///         let message: String = call.get_param("message")?;
///         Ok(json!({ "echo": message }))
///     },
/// );
/// ```
pub fn make_tool<F, Fut>(
    name: impl Into<String>,
    description: impl Into<String>,
    input_schema: ToolSchema,
    output_schema: ToolSchema,
    handler: F,
) -> FunctionTool
where
    F: Fn(FunctionCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    let handler: AsyncHandler = Arc::new(move |call| Box::pin(handler(call)));
    FunctionTool {
        definition: ToolDefinition::new(name, description, input_schema, output_schema),
        handler: Handler::Async(handler),
    }
}

/// Creates a tool from a synchronous handler, run via
/// [`tokio::task::spawn_blocking`].
pub fn make_blocking_tool<F>(
    name: impl Into<String>,
    description: impl Into<String>,
    input_schema: ToolSchema,
    output_schema: ToolSchema,
    handler: F,
) -> FunctionTool
where
    F: Fn(FunctionCall) -> Result<Value, ToolError> + Send + Sync + 'static,
{
    FunctionTool {
        definition: ToolDefinition::new(name, description, input_schema, output_schema),
        handler: Handler::Blocking(Arc::new(handler)),
    }
}

/// Creates a tool whose handler takes a single typed input.
///
/// Input and output schemas are generated from `I` and `O`.
///
/// # Errors
///
/// Returns [`ToolError::SerializationError`] if a generated schema cannot
/// be represented as a [`ToolSchema`].
pub fn make_typed_tool<I, O, F, Fut>(
    name: impl Into<String>,
    description: impl Into<String>,
    handler: F,
) -> Result<FunctionTool, ToolError>
where
    I: DeserializeOwned + JsonSchema + Send + 'static,
    O: Serialize + JsonSchema + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
{
    let input_schema = generated_schema::<I>()?;
    let output_schema = generated_schema::<O>()?;
    let handler = Arc::new(handler);

    Ok(make_tool(name, description, input_schema, output_schema, move |call: FunctionCall| {
        let handler = Arc::clone(&handler);
        async move {
            let input: I = call.parse()?;
            let output = handler(input).await?;
            Ok(serde_json::to_value(output)?)
        }
    }))
}

fn generated_schema<T: JsonSchema>() -> Result<ToolSchema, ToolError> {
    let mut value = serde_json::to_value(schemars::schema_for!(T))?;
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    Ok(ToolSchema::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{JsonType, PropertySchema};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    struct AddInput {
        a: i64,
        b: i64,
    }

    #[derive(Serialize, JsonSchema)]
    struct AddOutput {
        sum: i64,
    }

    #[tokio::test]
    async fn keyword_handler() {
        let tool = make_tool(
            "greet",
            "Greets",
            ToolSchema::object().required_property("name", PropertySchema::new(JsonType::String)),
            ToolSchema::object(),
            |call| async move {
                let name: String = call.get_param("name")?;
                Ok(json!({"greeting": format!("hello {name}")}))
            },
        );

        let output = tool.execute(json!({"name": "Ada"})).await.unwrap();
        assert_eq!(output, json!({"greeting": "hello Ada"}));
        assert_eq!(tool.definition().name, "greet");
    }

    #[tokio::test]
    async fn blocking_handler_runs_off_runtime() {
        let tool = make_blocking_tool(
            "sum",
            "Sums numbers",
            ToolSchema::object(),
            ToolSchema::object(),
            |call| {
                let numbers: Vec<i64> = call.get_param("numbers")?;
                Ok(json!(numbers.iter().sum::<i64>()))
            },
        );

        assert_eq!(tool.execute(json!({"numbers": [1, 2, 3]})).await.unwrap(), json!(6));
        assert!(matches!(
            tool.execute(json!({})).await,
            Err(ToolError::ParameterError(_))
        ));
    }

    #[tokio::test]
    async fn typed_handler_derives_schemas() {
        let tool = make_typed_tool("add", "Adds", |input: AddInput| async move {
            Ok(AddOutput {
                sum: input.a + input.b,
            })
        })
        .unwrap();

        let definition = tool.definition();
        assert!(definition.input_schema.properties.contains_key("a"));
        assert!(definition.input_schema.is_required("b"));
        assert!(definition.output_schema.properties.contains_key("sum"));

        let output = tool.execute(json!({"a": 2, "b": 3})).await.unwrap();
        assert_eq!(output, json!({"sum": 5}));
    }

    #[tokio::test]
    async fn non_object_arguments_fail() {
        let tool = make_tool("t", "", ToolSchema::object(), ToolSchema::object(), |_| async {
            Ok(Value::Null)
        });
        assert!(tool.execute(json!([1])).await.is_err());
    }
}
