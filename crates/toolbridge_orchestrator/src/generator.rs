//! Generates [`SimpleToolSpec`]s from API documentation.

use crate::prompt::{PromptError, PromptRequest, PromptService};
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use toolbridge_http::HttpMethod;
use toolbridge_tools::SimpleToolSpec;

/// Value stored in [`SimpleToolSpec::api_key`] when the docs require a key.
/// Replace it with the real key before executing the tool.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

const DEFAULT_KEY_HEADER: &str = "Authorization";
const USER_AGENT: &str = concat!("toolbridge/", env!("CARGO_PKG_VERSION"));

/// Errors from [`SimpleToolGenerator::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The model call failed.
    #[error("endpoint extraction failed: {0}")]
    Prompt(#[from] PromptError),
    /// The model found no URL in the docs.
    #[error("URL not extracted from API docs")]
    MissingUrl,
    /// The extracted URL is not absolute.
    #[error("extracted URL '{0}' is not an absolute http(s) URL")]
    InvalidUrl(String),
}

#[derive(Debug, Deserialize, JsonSchema)]
struct Endpoint {
    /// Complete endpoint URL including the path.
    url: String,
    /// One of GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS.
    method: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct KeyRequirement {
    /// Whether the API authenticates with an API key.
    requires_api_key: bool,
    /// Header or parameter name carrying the key.
    api_key_header: String,
}

/// Turns free-form API documentation into an executable [`SimpleToolSpec`].
///
/// Two model calls are made: one for the endpoint and method, one for the
/// API key requirement. Static headers are inferred from the docs text
/// without the model.
#[derive(Debug, Clone)]
pub struct SimpleToolGenerator {
    prompts: PromptService,
}

impl SimpleToolGenerator {
    /// Creates a generator over `prompts`.
    #[must_use]
    pub fn new(prompts: PromptService) -> Self {
        Self { prompts }
    }

    /// Generates a tool spec named `name`.
    ///
    /// A failed key-requirement call is not fatal: the spec is produced
    /// without a key.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] if the endpoint cannot be extracted.
    pub async fn generate(
        &self,
        name: &str,
        description: &str,
        api_docs: &str,
    ) -> Result<SimpleToolSpec, GeneratorError> {
        tracing::info!(tool = name, "generating simple tool spec");

        let (url, method) = self.extract_endpoint(description, api_docs).await?;
        tracing::info!(tool = name, %url, %method, "extracted endpoint");

        let mut spec = SimpleToolSpec::new(name, url).with_method(method);
        spec.description = Some(description.to_string()).filter(|text| !text.is_empty());
        spec.headers = static_headers(api_docs);

        match self.detect_key_header(api_docs).await {
            Some(header) => {
                tracing::info!(tool = name, header = %header, "API key required");
                spec = spec.with_api_key(header, API_KEY_PLACEHOLDER);
            }
            None => tracing::info!(tool = name, "no API key authentication detected"),
        }
        Ok(spec)
    }

    async fn extract_endpoint(
        &self,
        description: &str,
        api_docs: &str,
    ) -> Result<(String, HttpMethod), GeneratorError> {
        let request = PromptRequest::new(format!(
            "Extract the API endpoint URL and HTTP method from the API documentation.\n\n\
             Tool Description: {description}\n\n\
             API Documentation:\n{api_docs}\n\n\
             The URL must be the complete endpoint including its path, not only the base URL. \
             The method must be one of GET, POST, PUT, DELETE, PATCH, HEAD or OPTIONS."
        ));
        let endpoint: Endpoint = self.prompts.prompt_structured(&request).await?;

        let url = endpoint.url.trim();
        if url.is_empty() {
            return Err(GeneratorError::MissingUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GeneratorError::InvalidUrl(url.to_string()));
        }
        Ok((url.to_string(), parse_method(&endpoint.method)))
    }

    /// The header name for the API key, or `None` when no key is needed or
    /// the model call failed.
    async fn detect_key_header(&self, api_docs: &str) -> Option<String> {
        let request = PromptRequest::new(format!(
            "Analyze the API documentation and determine whether the API requires an API key \
             and, if so, which header or parameter carries it.\n\n\
             API Documentation:\n{api_docs}\n\n\
             If no API key is required, set requires_api_key to false and api_key_header to \
             \"{DEFAULT_KEY_HEADER}\"."
        ));
        match self.prompts.prompt_structured::<KeyRequirement>(&request).await {
            Ok(requirement) if requirement.requires_api_key => {
                Some(normalize_key_header(&requirement.api_key_header))
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = %err, "API key detection failed, assuming no key");
                None
            }
        }
    }
}

/// Parses a method name, falling back to `GET` for anything unknown.
fn parse_method(raw: &str) -> HttpMethod {
    match raw.trim().to_ascii_uppercase().as_str() {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "PATCH" => HttpMethod::Patch,
        "HEAD" => HttpMethod::Head,
        "OPTIONS" => HttpMethod::Options,
        other => {
            tracing::warn!(method = other, "unknown HTTP method, defaulting to GET");
            HttpMethod::Get
        }
    }
}

/// Canonical spelling of an API key header name.
///
/// `key`, `apikey` and `api_key` collapse to `key`; `authorization` becomes
/// `Authorization`; `X-` headers are lower-cased; anything else is kept.
#[must_use]
pub fn normalize_key_header(raw: &str) -> String {
    let header = raw.trim();
    let lowered = header.to_ascii_lowercase();
    match lowered.as_str() {
        "" | "authorization" => DEFAULT_KEY_HEADER.to_string(),
        "key" | "apikey" | "api_key" => "key".to_string(),
        _ if lowered.starts_with("x-") => lowered,
        _ => header.to_string(),
    }
}

/// Headers implied by the docs: JSON content negotiation and a user agent.
#[must_use]
pub fn static_headers(api_docs: &str) -> Option<BTreeMap<String, String>> {
    let docs = api_docs.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|word| docs.contains(*word));
    let mut headers = BTreeMap::new();

    if docs.contains("json") {
        if mentions(&["request", "send", "post", "put", "body"]) {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if mentions(&["response", "accept", "receive"]) {
            headers.insert("Accept".to_string(), "application/json".to_string());
        }
    }
    if docs.contains("user-agent") {
        headers.insert("User-Agent".to_string(), USER_AGENT.to_string());
    }

    (!headers.is_empty()).then_some(headers)
}
