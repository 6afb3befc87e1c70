//! Prompt service modes and retry behaviour.

mod common;

use common::{ScriptedProvider, messages_json};
use core::time::Duration;
use serde_json::json;
use toolbridge_http::{HttpMethod, RequestBody, RetryPolicy};
use toolbridge_orchestrator::{
    McpPromptRequest, PromptError, PromptKind, PromptRequest, PromptService, PromptTemplates,
};

fn service(provider: &std::sync::Arc<ScriptedProvider>, retries: u32) -> PromptService {
    PromptService::new(provider.llm())
        .with_retry_policy(RetryPolicy::new(retries).with_initial_backoff(Duration::from_millis(1)))
}

#[tokio::test]
async fn normal_mode_returns_text() {
    let provider = ScriptedProvider::new();
    provider.push_text("Paris");
    let prompts = service(&provider, 0);

    let response = prompts
        .prompt_normal(&PromptRequest::new("Capital of France?").with_context("geography quiz"))
        .await
        .unwrap();

    assert_eq!(response.kind, PromptKind::Text);
    assert_eq!(response.text().unwrap(), "Paris");
    let request = &provider.requests()[0];
    assert_eq!(request.system.as_deref(), Some(PromptTemplates::NORMAL_SYSTEM_PROMPT));
    assert!(messages_json(request).contains("Context: geography quiz"));
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let provider = ScriptedProvider::new();
    provider.push_error("reset");
    provider.push_text("   ");
    provider.push_text("third time lucky");
    let prompts = service(&provider, 2);

    let response = prompts.prompt_normal(&PromptRequest::new("hi")).await.unwrap();

    assert_eq!(response.text().unwrap(), "third time lucky");
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn retries_are_bounded() {
    let provider = ScriptedProvider::new();
    for _ in 0..5 {
        provider.push_error("down");
    }
    let prompts = service(&provider, 2);

    let err = prompts.prompt_normal(&PromptRequest::new("hi")).await.unwrap_err();

    assert!(matches!(err, PromptError::Generation(_)));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn mcp_mode_returns_request_spec() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({
        "method": "POST",
        "url": "https://api.example.com/orders",
        "headers": [{"key": "Content-Type", "value": "application/json"}],
        "query_params": [],
        "body": "{\"item\": \"widget\", \"qty\": 2}"
    }));
    let prompts = service(&provider, 0);

    let response = prompts
        .prompt_mcp(&McpPromptRequest::new("order two widgets", "POST /orders"))
        .await
        .unwrap();

    assert_eq!(response.kind, PromptKind::HttpSpec);
    let spec = response.http_spec().unwrap();
    assert_eq!(spec.method, HttpMethod::Post);
    assert_eq!(spec.url, "https://api.example.com/orders");
    assert_eq!(spec.body, Some(RequestBody::Json(json!({"item": "widget", "qty": 2}))));
    assert!(matches!(response.text(), Err(PromptError::UnexpectedKind { .. })));

    let request = &provider.requests()[0];
    assert_eq!(request.system.as_deref(), Some(PromptTemplates::MCP_SYSTEM_PROMPT));
    assert!(request.output_schema.is_some());
    assert!(messages_json(request).contains("API Documentation:\\nPOST /orders"));
}

#[tokio::test]
async fn malformed_structured_output_fails() {
    let provider = ScriptedProvider::new();
    provider.push_text("GET https://example.com");
    let prompts = service(&provider, 0);

    let err = prompts
        .prompt_mcp(&McpPromptRequest::new("x", "docs"))
        .await
        .unwrap_err();

    assert!(matches!(err, PromptError::Extraction(_)));
}

#[derive(Debug, PartialEq, serde::Deserialize, schemars::JsonSchema)]
struct Capital {
    city: String,
    country: String,
}

#[tokio::test]
async fn structured_mode_binds_the_answer_to_a_type() {
    let provider = ScriptedProvider::new();
    provider.push_text("Paris, France");
    provider.push_json(&json!({"city": "Paris", "country": "France"}));
    let prompts = service(&provider, 1);

    let capital: Capital = prompts
        .prompt_structured(&PromptRequest::new("Capital of France?"))
        .await
        .unwrap();

    assert_eq!(
        capital,
        Capital {
            city: "Paris".to_string(),
            country: "France".to_string(),
        }
    );
    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].system.as_deref(), Some(PromptTemplates::NORMAL_SYSTEM_PROMPT));
    assert!(requests[1].output_schema.is_some());
}
