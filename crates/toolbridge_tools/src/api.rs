//! The generic API tool engine.
//!
//! [`ApiTool`] turns a [`ToolSpec`] plus runtime arguments into an
//! authenticated [`HttpRequestSpec`], executes it, and maps the response
//! body back into the tool's output shape.

use crate::error::ToolError;
use crate::schema::JsonType;
use crate::secret::resolve_secret;
use crate::spec::{AuthMethod, ToolSpec};
use crate::tool::{Tool, ToolDefinition};
use core::future::Future;
use core::pin::Pin;
use core::time::Duration;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use toolbridge_http::{HttpClientService, HttpRequestSpec, HttpResponseSpec};

const DEFAULT_HEADER_KEY: &str = "X-API-Key";
const DEFAULT_QUERY_KEY: &str = "apikey";

/// A tool backed by a declarative [`ToolSpec`].
#[derive(Debug, Clone)]
pub struct ApiTool {
    spec: ToolSpec,
    http: HttpClientService,
}

impl ApiTool {
    /// Wraps a spec. The spec is not validated here; see
    /// [`ToolFactory`](crate::ToolFactory).
    pub fn new(spec: ToolSpec, http: HttpClientService) -> Self {
        Self { spec, http }
    }

    /// The underlying specification.
    #[must_use]
    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    /// Full endpoint URL.
    #[must_use]
    pub fn build_url(&self) -> String {
        let base = self.spec.api.base_url.trim_end_matches('/');
        let path = self.spec.api.path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Static headers plus the auth header, which replaces any static
    /// header of the same name.
    #[must_use]
    pub fn build_headers(&self) -> BTreeMap<String, String> {
        let mut headers: BTreeMap<String, String> = self
            .spec
            .api
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if let Some((name, value)) = self.credential_header() {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            headers.insert(name, value);
        }
        headers
    }

    /// The `(name, value)` auth header, if the auth method uses one.
    fn credential_header(&self) -> Option<(String, String)> {
        let auth = &self.spec.api.auth;
        match auth.method {
            AuthMethod::Bearer => Some((
                "Authorization".to_string(),
                format!("Bearer {}", resolve_secret(auth.secret_ref.as_deref())),
            )),
            AuthMethod::ApiKeyHeader => Some((
                auth.key_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HEADER_KEY.to_string()),
                resolve_secret(auth.secret_ref.as_deref()),
            )),
            AuthMethod::Oauth2 => {
                tracing::warn!(tool = %self.spec.name, "oauth2 is not supported, sending no credential");
                None
            }
            AuthMethod::None | AuthMethod::ApiKeyQuery => None,
        }
    }

    /// Static parameters, the query-string credential, then mapped inputs.
    #[must_use]
    pub fn build_query_params(&self, arguments: &Map<String, Value>) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = self
            .spec
            .api
            .params
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let auth = &self.spec.api.auth;
        if auth.method == AuthMethod::ApiKeyQuery {
            let key = auth.key_name.as_deref().unwrap_or(DEFAULT_QUERY_KEY);
            params.insert(key.to_string(), resolve_secret(auth.secret_ref.as_deref()));
        }

        for (input, param) in &self.spec.mapping.input_to_params {
            if let Some(value) = present(arguments, input) {
                params.insert(param.clone(), stringify(value));
            }
        }
        params
    }

    /// JSON body built from `input_to_body`; `None` when nothing maps.
    #[must_use]
    pub fn build_body(&self, arguments: &Map<String, Value>) -> Option<Value> {
        let body: Map<String, Value> = self
            .spec
            .mapping
            .input_to_body
            .iter()
            .filter_map(|(input, field)| {
                present(arguments, input).map(|value| (field.clone(), value.clone()))
            })
            .collect();

        (!body.is_empty()).then_some(Value::Object(body))
    }

    /// The complete request for a set of validated arguments.
    #[must_use]
    pub fn build_request(&self, arguments: &Map<String, Value>) -> HttpRequestSpec {
        let headers = self.build_headers();
        let params = self.build_query_params(arguments);
        HttpRequestSpec {
            method: self.spec.api.method.to_http(),
            url: self.build_url(),
            headers: (!headers.is_empty()).then_some(headers),
            query_params: (!params.is_empty()).then_some(params),
            body: self.build_body(arguments).map(Into::into),
        }
    }

    /// Adds this tool's credential to a request built elsewhere.
    ///
    /// Used when an LLM wrote the request from the tool's description and
    /// only knows the auth requirement, not the secret. Existing headers
    /// of the same name are replaced.
    ///
    /// The credential is only attached when the request targets this tool's
    /// endpoint origin (scheme, host and port). Returns `false` and leaves
    /// the request untouched otherwise.
    pub fn apply_credentials(&self, request: &mut HttpRequestSpec) -> bool {
        let endpoint = self.build_url();
        if !request.same_origin(&endpoint) {
            tracing::warn!(
                tool = %self.spec.name,
                target = %request.url,
                endpoint = %endpoint,
                "request targets a different origin, not attaching credentials"
            );
            return false;
        }

        let auth = &self.spec.api.auth;
        match auth.method {
            AuthMethod::ApiKeyQuery => {
                let key = auth.key_name.as_deref().unwrap_or(DEFAULT_QUERY_KEY);
                request
                    .query_params
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key.to_string(), resolve_secret(auth.secret_ref.as_deref()));
            }
            AuthMethod::ApiKeyHeader | AuthMethod::Bearer => {
                if let Some((name, value)) = self.credential_header() {
                    let headers = request.headers.get_or_insert_with(BTreeMap::new);
                    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
                    headers.insert(name, value);
                }
            }
            AuthMethod::None | AuthMethod::Oauth2 => {}
        }
        true
    }

    /// Maps a response body into the tool output.
    ///
    /// `response_path` selects the working object (a missing segment yields
    /// an empty object). Each `response_to_output` path is looked up inside
    /// it and coerced by the output schema; missing paths are omitted.
    #[must_use]
    pub fn transform_response(&self, body: &Value) -> Value {
        let mapping = &self.spec.mapping;
        let empty = Value::Object(Map::new());

        let working = match mapping.response_path.as_deref() {
            Some(path) if !path.is_empty() => lookup_path(body, path).unwrap_or(&empty),
            _ => body,
        };

        if mapping.response_to_output.is_empty() {
            return working.clone();
        }

        let mut output = Map::new();
        for (field, path) in &mapping.response_to_output {
            let Some(value) = lookup_path(working, path) else {
                tracing::debug!(tool = %self.spec.name, field = %field, path = %path, "response field missing");
                continue;
            };
            let target = self
                .spec
                .output_schema
                .properties
                .get(field)
                .and_then(|property| property.kind.as_ref())
                .and_then(crate::schema::TypeSpec::primary);
            output.insert(field.clone(), coerce(value, target));
        }
        Value::Object(output)
    }

    /// Executes the tool with already-validated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Http`] when the call fails after retries, and
    /// [`ToolError::ExecutionError`] for non-2xx statuses and non-JSON
    /// bodies.
    pub async fn call(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let request = self.build_request(arguments);
        let timeout = Duration::try_from_secs_f64(self.spec.api.timeout)
            .unwrap_or_else(|_| self.http.timeout());

        tracing::debug!(
            tool = %self.spec.name,
            method = %request.method,
            url = %request.url,
            "calling api tool"
        );

        let response = self.http.execute_with_timeout(&request, timeout).await?;
        if !response.is_success() {
            return Err(ToolError::execution_error(format!(
                "HTTP {}: {}",
                response.status_code,
                body_text(&response)
            )));
        }

        let body = json_body(&response)?;
        Ok(self.transform_response(&body))
    }
}

impl Tool for ApiTool {
    fn definition(&self) -> ToolDefinition {
        self.spec.definition()
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let arguments = match args {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                _ => return Err(ToolError::parameter_error("Parameters must be an object")),
            };
            self.call(&arguments).await
        })
    }
}

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn present<'a>(arguments: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    arguments.get(name).filter(|value| !value.is_null())
}

/// Strings verbatim, every other value as JSON text.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Resolves a dotted path.
///
/// At each object the longest prefix of the remaining path that is itself
/// a key wins, so keys such as `"05. price"` resolve directly.
pub(crate) fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let Value::Object(map) = value else {
        return None;
    };
    if let Some(found) = map.get(path) {
        return Some(found);
    }

    let mut split_points: Vec<usize> = path.match_indices('.').map(|(index, _)| index).collect();
    split_points.reverse();
    split_points.into_iter().find_map(|index| {
        let (key, rest) = (&path[..index], &path[index + 1..]);
        map.get(key).and_then(|child| lookup_path(child, rest))
    })
}

/// Coerces a value towards the output schema type; failures keep the raw value.
fn coerce(value: &Value, target: Option<JsonType>) -> Value {
    let as_float = || match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match target {
        Some(JsonType::Number) => as_float()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| value.clone(), Value::Number),
        Some(JsonType::Integer) => as_float()
            .filter(|float| float.is_finite() && float.abs() < 9.0e15)
            .map_or_else(|| value.clone(), |float| Value::from(truncate(float))),
        _ => value.clone(),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "integer coercion truncates toward zero; range checked by caller"
)]
fn truncate(float: f64) -> i64 {
    float.trunc() as i64
}

fn json_body(response: &HttpResponseSpec) -> Result<Value, ToolError> {
    let declared_json = response
        .header("content-type")
        .is_some_and(|content_type| content_type.contains("json"));

    match &response.body {
        Some(body) if declared_json => Ok(body.clone()),
        Some(Value::String(text)) => serde_json::from_str(text).map_err(|err| {
            ToolError::execution_error(format!("response body is not JSON: {err}"))
        }),
        Some(body) => Ok(body.clone()),
        None => Err(ToolError::execution_error("response body is empty")),
    }
}

fn body_text(response: &HttpResponseSpec) -> String {
    match &response.body {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
