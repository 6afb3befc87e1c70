//! Simple tool generation from API docs against a scripted model.

mod common;

use common::{ScriptedProvider, messages_json};
use serde_json::json;
use std::sync::Arc;
use toolbridge_http::{HttpMethod, RetryPolicy};
use toolbridge_orchestrator::{API_KEY_PLACEHOLDER, GeneratorError, PromptService, SimpleToolGenerator};

const WEATHER_DOCS: &str = "GET https://api.weather.test/v1/current?city=NAME returns a JSON response. \
    Authenticate with your key in the X-Api-Key header.";

fn generator(provider: &Arc<ScriptedProvider>) -> SimpleToolGenerator {
    SimpleToolGenerator::new(PromptService::new(provider.llm()).with_retry_policy(RetryPolicy::new(0)))
}

#[tokio::test]
async fn docs_become_an_executable_spec() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({"url": "https://api.weather.test/v1/current", "method": "get"}));
    provider.push_json(&json!({"requires_api_key": true, "api_key_header": "X-Api-Key"}));

    let spec = generator(&provider)
        .generate("current_weather", "Current weather for a city", WEATHER_DOCS)
        .await
        .unwrap();

    assert_eq!(spec.name, "current_weather");
    assert_eq!(spec.description.as_deref(), Some("Current weather for a city"));
    assert_eq!(spec.url, "https://api.weather.test/v1/current");
    assert_eq!(spec.method, HttpMethod::Get);
    assert_eq!(spec.api_key.as_deref(), Some(API_KEY_PLACEHOLDER));
    assert_eq!(spec.api_key_header, "x-api-key");
    let headers = spec.headers.expect("JSON docs imply headers");
    assert_eq!(headers["Accept"], "application/json");

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|request| request.output_schema.is_some()));
    assert!(messages_json(&requests[0]).contains("Current weather for a city"));
}

#[tokio::test]
async fn failed_key_detection_yields_a_keyless_spec() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({"url": "https://api.weather.test/v1/current", "method": "POST"}));
    provider.push_text("not json at all");

    let spec = generator(&provider)
        .generate("current_weather", "", WEATHER_DOCS)
        .await
        .unwrap();

    assert_eq!(spec.method, HttpMethod::Post);
    assert_eq!(spec.api_key, None);
    assert_eq!(spec.description, None);
}

#[tokio::test]
async fn keys_are_only_added_when_required() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({"url": "https://open.test/items", "method": "BREW"}));
    provider.push_json(&json!({"requires_api_key": false, "api_key_header": "Authorization"}));

    let spec = generator(&provider)
        .generate("items", "List items", "Public plain text endpoint.")
        .await
        .unwrap();

    assert_eq!(spec.method, HttpMethod::Get);
    assert_eq!(spec.api_key, None);
    assert_eq!(spec.headers, None);
}

#[tokio::test]
async fn unusable_urls_are_rejected() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({"url": "  ", "method": "GET"}));
    provider.push_json(&json!({"url": "/v1/current", "method": "GET"}));
    let generator = generator(&provider);

    let err = generator.generate("weather", "", WEATHER_DOCS).await.unwrap_err();
    assert!(matches!(err, GeneratorError::MissingUrl));

    let err = generator.generate("weather", "", WEATHER_DOCS).await.unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidUrl(url) if url == "/v1/current"));
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn model_failures_surface_as_prompt_errors() {
    let provider = ScriptedProvider::new();
    provider.push_error("down");

    let err = generator(&provider)
        .generate("weather", "", WEATHER_DOCS)
        .await
        .unwrap_err();

    assert!(matches!(err, GeneratorError::Prompt(_)));
}
