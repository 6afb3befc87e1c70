//! Minimal URL-based tools.
//!
//! A [`SimpleToolSpec`] is a fixed URL plus method and optional API key.
//! [`SimpleToolExecutor`] routes call parameters to the query string or
//! the JSON body depending on the method and returns the raw response.

use crate::api::stringify;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use toolbridge_http::{HttpClientService, HttpError, HttpMethod, HttpRequestSpec, HttpResponseSpec};

const REDACTED: &str = "***REDACTED***";
const SENSITIVE_KEYS: [&str; 7] = ["password", "token", "secret", "api_key", "apikey", "key", "auth"];

/// A lightweight tool definition addressing one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleToolSpec {
    /// Tool name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Complete endpoint URL.
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Static headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// API key injected into `api_key_header`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Header carrying the API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

fn default_api_key_header() -> String {
    "Authorization".to_string()
}

impl SimpleToolSpec {
    /// Creates a GET tool without headers or key.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            url: url.into(),
            method: HttpMethod::Get,
            headers: None,
            api_key: None,
            api_key_header: default_api_key_header(),
        }
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the API key and the header carrying it.
    #[must_use]
    pub fn with_api_key(mut self, header: impl Into<String>, key: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self.api_key = Some(key.into());
        self
    }

    /// Adds a static header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// Executes [`SimpleToolSpec`]s through the shared HTTP service.
#[derive(Debug, Clone, Default)]
pub struct SimpleToolExecutor {
    http: HttpClientService,
}

impl SimpleToolExecutor {
    /// Creates an executor around `http`.
    #[must_use]
    pub fn new(http: HttpClientService) -> Self {
        Self { http }
    }

    /// Executes `spec` with `parameters`.
    ///
    /// # Errors
    ///
    /// Returns the [`HttpError`] of the underlying call.
    pub async fn execute(
        &self,
        spec: &SimpleToolSpec,
        parameters: &Map<String, Value>,
    ) -> Result<HttpResponseSpec, HttpError> {
        let start = Instant::now();
        tracing::info!(tool = %spec.name, method = %spec.method, url = %spec.url, "executing simple tool");
        if !parameters.is_empty() {
            let redacted = Value::Object(redact(parameters));
            tracing::debug!(parameters = %redacted, "simple tool parameters");
        }

        let request = build_request(spec, parameters);
        let outcome = self.http.execute(&request).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(response) => tracing::info!(
                tool = %spec.name,
                status = response.status_code,
                elapsed_ms,
                "simple tool completed"
            ),
            Err(err) => tracing::error!(tool = %spec.name, elapsed_ms, error = %err, "simple tool failed"),
        }
        outcome
    }
}

/// Builds the request: query-only methods get stringified query
/// parameters, all others a JSON body.
#[must_use]
pub fn build_request(spec: &SimpleToolSpec, parameters: &Map<String, Value>) -> HttpRequestSpec {
    let mut headers = spec.headers.clone().unwrap_or_default();
    if let Some(key) = &spec.api_key {
        headers.insert(spec.api_key_header.clone(), key.clone());
    }

    let mut request = HttpRequestSpec::new(spec.method, spec.url.clone());
    request.headers = (!headers.is_empty()).then_some(headers);

    if !parameters.is_empty() {
        if spec.method.is_query_only() {
            request.query_params = Some(
                parameters
                    .iter()
                    .map(|(name, value)| (name.clone(), stringify(value)))
                    .collect(),
            );
        } else {
            request = request.json(Value::Object(parameters.clone()));
        }
    }
    request
}

/// Masks values of sensitive keys for logging.
#[must_use]
pub fn redact(parameters: &Map<String, Value>) -> Map<String, Value> {
    parameters
        .iter()
        .map(|(name, value)| {
            let lowered = name.to_lowercase();
            if SENSITIVE_KEYS.contains(&lowered.as_str()) {
                (name.clone(), Value::String(REDACTED.to_string()))
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn spec_defaults() {
        let spec: SimpleToolSpec =
            serde_json::from_value(json!({"name": "weather", "url": "https://api.test/w"})).unwrap();
        assert_eq!(spec.method, HttpMethod::Get);
        assert_eq!(spec.api_key_header, "Authorization");
    }

    #[test]
    fn get_routes_to_query() {
        let spec = SimpleToolSpec::new("weather", "https://api.test/w").with_api_key("X-Key", "k1");
        let request = build_request(&spec, &params(json!({"city": "Oslo", "days": 3})));

        assert!(request.body.is_none());
        let query = request.query_params.unwrap();
        assert_eq!(query["city"], "Oslo");
        assert_eq!(query["days"], "3");
        assert_eq!(request.headers.unwrap()["X-Key"], "k1");
    }

    #[test]
    fn post_routes_to_body() {
        let spec = SimpleToolSpec::new("create", "https://api.test/items").with_method(HttpMethod::Post);
        let request = build_request(&spec, &params(json!({"title": "x"})));

        assert!(request.query_params.is_none());
        assert!(request.headers.is_none());
        assert_eq!(request.body, Some(json!({"title": "x"}).into()));
    }

    #[test]
    fn empty_parameters_send_nothing() {
        let spec = SimpleToolSpec::new("create", "https://api.test/items").with_method(HttpMethod::Put);
        let request = build_request(&spec, &Map::new());
        assert!(request.body.is_none());
        assert!(request.query_params.is_none());
    }

    #[test]
    fn sensitive_values_are_redacted() {
        let redacted = redact(&params(json!({"API_KEY": "s3cret", "Token": "t", "city": "Oslo"})));
        assert_eq!(redacted["API_KEY"], REDACTED);
        assert_eq!(redacted["Token"], REDACTED);
        assert_eq!(redacted["city"], "Oslo");
    }
}
