//! Shared test helpers for provider integration tests.

use std::future::Future;
use std::sync::Once;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use toolbridge_models::llm::{GenerationRequest, Llm, ToolChoice, ToolDefinition};

static INIT: Once = Once::new();

/// Initialize environment variables from `.env` file (once).
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// Structured output target mirroring a generated HTTP call.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EndpointGuess {
    pub method: String,
    pub url: String,
}

fn quote_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_stock_quote".to_string(),
        description: "Get the latest stock quote for a ticker symbol".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Ticker symbol, e.g. IBM"
                }
            },
            "required": ["symbol"]
        }),
    }
}

/// Extension trait for testing LLM providers.
pub trait LlmTestExt {
    /// Tests basic generation - expects the model to say "hello".
    fn test_basic_generation(&self) -> impl Future<Output = ()> + Send;

    /// Tests tool calling - expects the model to call the quote tool.
    fn test_tool_calling(&self) -> impl Future<Output = ()> + Send;

    /// Tests structured output - expects an endpoint description.
    fn test_structured_output(&self) -> impl Future<Output = ()> + Send;

    /// Tests that an invalid model returns an error.
    fn test_invalid_model_error(&self) -> impl Future<Output = ()> + Send;
}

impl LlmTestExt for Llm {
    async fn test_basic_generation(&self) {
        let request = GenerationRequest::new("Say 'hello' and nothing else.");

        let response = self
            .generate(request)
            .await
            .expect("generation should succeed");

        let text = response.text().to_lowercase();
        assert!(
            text.contains("hello"),
            "response should contain 'hello': {text}"
        );
    }

    async fn test_tool_calling(&self) {
        let request = GenerationRequest::new("What is IBM trading at right now?")
            .tool(quote_tool())
            .tool_choice(ToolChoice::Required);

        let response = self
            .generate(request)
            .await
            .expect("generation should succeed");

        let tool_calls = response.tool_calls();
        assert!(!tool_calls.is_empty(), "should have at least one tool call");
        assert_eq!(tool_calls[0].function.name, "get_stock_quote");
        assert!(tool_calls[0].call_id.is_some(), "call_id should be present");

        let args = &tool_calls[0].function.arguments;
        assert!(
            args.get("symbol").is_some(),
            "tool call should have a symbol argument: {args:?}"
        );
    }

    async fn test_structured_output(&self) {
        let request = GenerationRequest::new(
            "Describe an HTTP GET request to https://example.com/api/items as method and url.",
        );

        let guess: EndpointGuess = self
            .generate_structured(request)
            .await
            .expect("structured generation should succeed");

        assert_eq!(guess.method.to_uppercase(), "GET");
        assert!(guess.url.contains("example.com"), "url: {}", guess.url);
    }

    async fn test_invalid_model_error(&self) {
        let request = GenerationRequest::new("Hello");
        let result = self.generate(request).await;

        assert!(result.is_err(), "should fail with invalid model");
    }
}
