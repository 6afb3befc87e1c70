//! LLM prompting in normal and MCP mode, with retries.

use super::templates::PromptTemplates;
use core::time::Duration;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use toolbridge_http::{HttpMethod, HttpRequestSpec, RequestBody, RetryPolicy};
use toolbridge_models::llm::{ExtractionError, GenerationError, GenerationRequest, Llm};

/// Errors from [`PromptService`].
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The model call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// Structured output could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The model returned no text.
    #[error("LLM returned an empty response")]
    EmptyResponse,
    /// The generated request cannot be executed.
    #[error("invalid HTTP specification: {0}")]
    InvalidHttpSpec(String),
    /// A response of one kind was read as another.
    #[error("expected a {expected} response, got {actual}")]
    UnexpectedKind {
        /// The kind asked for.
        expected: PromptKind,
        /// The kind present.
        actual: PromptKind,
    },
}

impl PromptError {
    /// Model-side failures are retried; malformed output is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Generation(_) | Self::Extraction(_) | Self::EmptyResponse
        )
    }
}

/// Input for [`PromptService::prompt_normal`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    /// What to do.
    pub instructions: String,
    /// Background the model should take into account.
    #[serde(default)]
    pub context: Option<String>,
    /// How the answer should be shaped.
    #[serde(default)]
    pub response_format_prompt: Option<String>,
}

impl PromptRequest {
    /// A request with only instructions.
    #[must_use]
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Self::default()
        }
    }

    /// Adds context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Adds response format guidance.
    #[must_use]
    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format_prompt = Some(format.into());
        self
    }
}

/// Input for [`PromptService::prompt_mcp`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpPromptRequest {
    /// What the request should accomplish.
    pub instructions: String,
    /// Description of the available endpoints.
    pub api_docs: String,
    /// How the answer should be shaped.
    #[serde(default)]
    pub response_format_prompt: Option<String>,
}

impl McpPromptRequest {
    /// A request over `api_docs`.
    #[must_use]
    pub fn new(instructions: impl Into<String>, api_docs: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            api_docs: api_docs.into(),
            response_format_prompt: None,
        }
    }
}

/// Which prompting mode produced a [`PromptResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Free text.
    Text,
    /// An HTTP request specification.
    HttpSpec,
}

impl core::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::HttpSpec => "http_spec",
        })
    }
}

/// Tagged prompting result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse {
    /// A JSON string for text, a serialized [`HttpRequestSpec`] otherwise.
    pub content: Value,
    /// What `content` holds.
    #[serde(rename = "type")]
    pub kind: PromptKind,
}

impl PromptResponse {
    /// The text of a normal-mode response.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::UnexpectedKind`] for HTTP spec responses.
    pub fn text(&self) -> Result<&str, PromptError> {
        match (&self.kind, &self.content) {
            (PromptKind::Text, Value::String(text)) => Ok(text),
            _ => Err(PromptError::UnexpectedKind {
                expected: PromptKind::Text,
                actual: self.kind,
            }),
        }
    }

    /// The request of an MCP-mode response.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::UnexpectedKind`] for text responses, or
    /// [`PromptError::InvalidHttpSpec`] if the content does not decode.
    pub fn http_spec(&self) -> Result<HttpRequestSpec, PromptError> {
        if self.kind != PromptKind::HttpSpec {
            return Err(PromptError::UnexpectedKind {
                expected: PromptKind::HttpSpec,
                actual: self.kind,
            });
        }
        serde_json::from_value(self.content.clone())
            .map_err(|err| PromptError::InvalidHttpSpec(err.to_string()))
    }
}

/// Name/value pair; strict structured output cannot express open maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeyValue {
    /// Header or parameter name.
    pub key: String,
    /// Its value.
    pub value: String,
}

/// HTTP request as emitted by the model in MCP mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedHttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Complete URL.
    pub url: String,
    /// Request headers.
    pub headers: Vec<KeyValue>,
    /// Query parameters.
    pub query_params: Vec<KeyValue>,
    /// Body, JSON-encoded when structured.
    pub body: Option<String>,
}

impl GeneratedHttpRequest {
    /// Converts into an executable request.
    ///
    /// A body that parses as JSON is sent as JSON, anything else as text.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::InvalidHttpSpec`] unless the URL is absolute
    /// `http` or `https`.
    pub fn into_request_spec(self) -> Result<HttpRequestSpec, PromptError> {
        let url = self.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PromptError::InvalidHttpSpec(format!(
                "url must be absolute http(s), got '{url}'"
            )));
        }

        Ok(HttpRequestSpec {
            method: self.method,
            url: url.to_string(),
            headers: pairs_to_map(self.headers),
            query_params: pairs_to_map(self.query_params),
            body: self.body.filter(|body| !body.trim().is_empty()).map(|body| {
                serde_json::from_str::<Value>(&body)
                    .map_or_else(|_| RequestBody::Text(body), RequestBody::from)
            }),
        })
    }
}

fn pairs_to_map(pairs: Vec<KeyValue>) -> Option<BTreeMap<String, String>> {
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.into_iter().map(|pair| (pair.key, pair.value)).collect())
}

/// Prompts an LLM in normal or MCP mode.
#[derive(Debug, Clone)]
pub struct PromptService {
    llm: Llm,
    retry: RetryPolicy,
}

impl PromptService {
    /// Creates a service with two retries and 2s to 10s backoff.
    #[must_use]
    pub fn new(llm: Llm) -> Self {
        Self {
            llm,
            retry: RetryPolicy::new(2)
                .with_initial_backoff(Duration::from_secs(2))
                .with_max_backoff(Duration::from_secs(10)),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The retry policy in use.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Asks for a free-text answer.
    ///
    /// # Errors
    ///
    /// Returns the last [`PromptError`] once retries are exhausted.
    pub async fn prompt_normal(&self, request: &PromptRequest) -> Result<PromptResponse, PromptError> {
        let (system, user) = PromptTemplates::normal_mode_prompt(
            &request.instructions,
            request.context.as_deref(),
            request.response_format_prompt.as_deref(),
        );

        let (system, user) = (&system, &user);
        self.with_retry("normal", move || async move {
            let response = self
                .llm
                .generate(GenerationRequest::with_system(system.as_str(), user.as_str()))
                .await?;
            let text = response.text();
            if text.trim().is_empty() {
                return Err(PromptError::EmptyResponse);
            }
            Ok::<_, PromptError>(PromptResponse {
                content: Value::String(text),
                kind: PromptKind::Text,
            })
        })
        .await
    }

    /// Asks for a normal-mode answer shaped as `T` through structured output.
    ///
    /// # Errors
    ///
    /// Returns the last [`PromptError`] once retries are exhausted.
    pub async fn prompt_structured<T>(&self, request: &PromptRequest) -> Result<T, PromptError>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let (system, user) = PromptTemplates::normal_mode_prompt(
            &request.instructions,
            request.context.as_deref(),
            request.response_format_prompt.as_deref(),
        );

        let (system, user) = (&system, &user);
        self.with_retry("structured", move || async move {
            let request = GenerationRequest::with_system(system.as_str(), user.as_str());
            Ok::<_, PromptError>(self.llm.generate_structured::<T>(request).await?)
        })
        .await
    }

    /// Asks the model to write an HTTP request against `api_docs`.
    ///
    /// # Errors
    ///
    /// Returns the last [`PromptError`] once retries are exhausted, or
    /// [`PromptError::InvalidHttpSpec`] for an unusable request.
    pub async fn prompt_mcp(&self, request: &McpPromptRequest) -> Result<PromptResponse, PromptError> {
        let (system, user) = PromptTemplates::mcp_mode_prompt(
            &request.instructions,
            &request.api_docs,
            request.response_format_prompt.as_deref(),
        );

        let (system, user) = (&system, &user);
        let generated = self
            .with_retry("mcp", move || async move {
                let request = GenerationRequest::with_system(system.as_str(), user.as_str());
                Ok::<_, PromptError>(
                    self.llm
                        .generate_structured::<GeneratedHttpRequest>(request)
                        .await?,
                )
            })
            .await?;

        let spec = generated.into_request_spec()?;
        tracing::debug!(method = %spec.method, url = %spec.url, "model generated HTTP request");
        let content = serde_json::to_value(&spec)
            .map_err(|err| PromptError::InvalidHttpSpec(err.to_string()))?;
        Ok(PromptResponse {
            content,
            kind: PromptKind::HttpSpec,
        })
    }

    async fn with_retry<T, F, Fut>(&self, mode: &'static str, mut call: F) -> Result<T, PromptError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PromptError>>,
    {
        let max_attempts = self.retry.max_attempts();
        let mut attempt: u32 = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.backoff_for_attempt(attempt);
                    tracing::warn!(
                        mode,
                        error = %err,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        "prompt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(mode, error = %err, attempts = attempt, "prompt failed");
                    return Err(err);
                }
            }
        }
    }
}
