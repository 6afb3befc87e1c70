//! Retrying HTTP execution service.

use crate::error::HttpError;
use crate::retry::RetryPolicy;
use crate::spec::{HttpRequestSpec, HttpResponseSpec, RequestBody};
use core::time::Duration;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes [`HttpRequestSpec`]s with bounded retries.
///
/// Timeouts, connection failures and 5xx responses are retried according to
/// the [`RetryPolicy`]. 4xx responses are returned as-is after one attempt.
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClientService {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for HttpClientService {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, RetryPolicy::default())
    }
}

impl HttpClientService {
    /// Creates a service with its own connection pool.
    #[must_use]
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self::with_client(reqwest::Client::new(), timeout, retry)
    }

    /// Creates a service around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    /// Per-attempt timeout used by [`execute`](Self::execute).
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The retry policy applied to every call.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Executes a request with the service's default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the envelope is invalid, or when a timeout,
    /// network failure or 5xx response persists after all retries.
    pub async fn execute(&self, request: &HttpRequestSpec) -> Result<HttpResponseSpec, HttpError> {
        self.execute_with_timeout(request, self.timeout).await
    }

    /// Executes a request with an explicit per-attempt timeout.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_with_timeout(
        &self,
        request: &HttpRequestSpec,
        timeout: Duration,
    ) -> Result<HttpResponseSpec, HttpError> {
        let url = build_url(request)?;
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts();
        let mut attempt: u32 = 1;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            has_body = request.body.is_some(),
            "executing HTTP request"
        );

        loop {
            match self.attempt(request, &url, timeout, attempt).await {
                Ok(mut response) => {
                    response.execution_time_ms = Some(elapsed_ms(started));
                    tracing::info!(
                        method = %request.method,
                        url = %request.url,
                        status = response.status_code,
                        attempts = attempt,
                        "HTTP request completed"
                    );
                    return Ok(response);
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.backoff_for_attempt(attempt);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        "HTTP attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(error = %err, attempts = attempt, "HTTP request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &HttpRequestSpec,
        url: &Url,
        timeout: Duration,
        attempt: u32,
    ) -> Result<HttpResponseSpec, HttpError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), url.clone())
            .timeout(timeout);

        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        match &request.body {
            Some(RequestBody::Json(body)) => {
                let bytes = serde_json::to_vec(body).map_err(|err| {
                    HttpError::invalid_request(format!("body is not serializable: {err}"))
                })?;
                if !request.has_header(CONTENT_TYPE.as_str()) {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                }
                builder = builder.body(bytes);
            }
            Some(RequestBody::Text(body)) => builder = builder.body(body.clone()),
            None => {}
        }

        let response = builder
            .send()
            .await
            .map_err(|err| classify(err, &request.url, timeout, attempt))?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify(err, &request.url, timeout, attempt))?;
        let content_type = headers.get("content-type").map(String::as_str);
        let body = parse_body(status, content_type, &bytes);

        if status >= 500 {
            return Err(HttpError::Status {
                status,
                url: request.url.clone(),
                body,
                attempts: attempt,
            });
        }

        Ok(HttpResponseSpec {
            status_code: status,
            headers: Some(headers),
            body,
            execution_time_ms: None,
        })
    }
}

fn build_url(request: &HttpRequestSpec) -> Result<Url, HttpError> {
    let mut url = Url::parse(&request.url)
        .map_err(|err| HttpError::invalid_request(format!("invalid URL '{}': {err}", request.url)))?;

    if let Some(params) = request.query_params.as_ref().filter(|params| !params.is_empty()) {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}

/// Maps a transport failure to [`HttpError`].
///
/// Errors carry the envelope URL, never the URL with query parameters
/// appended, since those may hold credentials.
fn classify(err: reqwest::Error, url: &str, timeout: Duration, attempt: u32) -> HttpError {
    let err = err.without_url();
    if err.is_timeout() {
        HttpError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs_f64(),
            attempts: attempt,
        }
    } else if err.is_builder() {
        HttpError::invalid_request(err.to_string())
    } else {
        HttpError::Network {
            url: url.to_string(),
            message: err.to_string(),
            attempts: attempt,
        }
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// Decodes a response body: JSON when declared (text on parse failure), text
/// otherwise, `None` for 204 or empty payloads.
fn parse_body(status: u16, content_type: Option<&str>, bytes: &[u8]) -> Option<Value> {
    if status == 204 || bytes.is_empty() {
        return None;
    }

    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if is_json && let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        return Some(value);
    }

    let text = String::from_utf8_lossy(bytes);
    if text.is_empty() {
        None
    } else {
        Some(Value::String(text.into_owned()))
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
