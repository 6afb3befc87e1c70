//! `SimpleToolExecutor` against a mock backend.

use serde_json::{Map, Value, json};
use toolbridge_http::HttpMethod;
use toolbridge_tools::{SimpleToolExecutor, SimpleToolSpec};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[tokio::test]
async fn get_sends_query_and_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Oslo"))
        .and(query_param("metric", "true"))
        .and(header("authorization", "Bearer k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"temp": 4})))
        .expect(1)
        .mount(&server)
        .await;

    let spec = SimpleToolSpec::new("weather", format!("{}/weather", server.uri()))
        .with_api_key("Authorization", "Bearer k");
    let response = SimpleToolExecutor::default()
        .execute(&spec, &params(json!({"city": "Oslo", "metric": true})))
        .await
        .expect("call should succeed");

    assert_eq!(response.body, Some(json!({"temp": 4})));
}

#[tokio::test]
async fn patch_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/items/1"))
        .and(body_json(json!({"name": "renamed"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let spec = SimpleToolSpec::new("rename", format!("{}/items/1", server.uri()))
        .with_method(HttpMethod::Patch);
    let response = SimpleToolExecutor::default()
        .execute(&spec, &params(json!({"name": "renamed"})))
        .await
        .expect("call should succeed");

    assert_eq!(response.status_code, 204);
    assert!(response.body.is_none());
}
