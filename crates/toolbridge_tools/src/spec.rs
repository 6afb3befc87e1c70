//! Declarative tool specifications.
//!
//! A [`ToolSpec`] describes one REST call: where it goes, how it
//! authenticates, which inputs become query parameters or body fields, and
//! which parts of the response become the tool's output. Specs are plain
//! serde data and can be loaded from JSON through
//! [`ToolFactory`](crate::ToolFactory).

use crate::error::ToolError;
use crate::schema::ToolSchema;
use crate::tool::ToolDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolbridge_http::HttpMethod;

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Complete description of a configuration-backed tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name.
    pub name: String,
    /// Description shown to the LLM.
    #[serde(default)]
    pub description: String,
    /// Specification version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Disabled specs are refused by the factory.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Endpoint and authentication.
    pub api: ApiConfig,
    /// Schema of the tool arguments.
    #[serde(default)]
    pub input_schema: ToolSchema,
    /// Schema of the tool output.
    #[serde(default)]
    pub output_schema: ToolSchema,
    /// Input and response field mappings.
    #[serde(default)]
    pub mapping: FieldMapping,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_version() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

impl ToolSpec {
    /// Creates an enabled spec with empty schemas and mappings.
    pub fn new(name: impl Into<String>, description: impl Into<String>, api: ApiConfig) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: default_version(),
            enabled: true,
            api,
            input_schema: ToolSchema::object(),
            output_schema: ToolSchema::object(),
            mapping: FieldMapping::default(),
            tags: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Sets the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: ToolSchema) -> Self {
        self.input_schema = schema;
        self
    }

    /// Sets the output schema.
    #[must_use]
    pub fn with_output_schema(mut self, schema: ToolSchema) -> Self {
        self.output_schema = schema;
        self
    }

    /// Sets the field mapping.
    #[must_use]
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] if the name or base URL is empty
    /// or the timeout is not a positive number.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::configuration("tool name must not be empty"));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ToolError::configuration(format!(
                "tool '{}' has an empty api.base_url",
                self.name
            )));
        }
        if !(self.api.timeout.is_finite() && self.api.timeout > 0.0) {
            return Err(ToolError::configuration(format!(
                "tool '{}' has a non-positive api.timeout ({})",
                self.name, self.api.timeout
            )));
        }
        Ok(())
    }

    /// Projects the spec onto the registry's definition type.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
            version: self.version,
            tags: self.tags.clone(),
        }
    }
}

/// HTTP methods a tool spec may use.
///
/// Any other method in a spec document fails deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl ApiMethod {
    /// The corresponding transport method.
    #[must_use]
    pub fn to_http(self) -> HttpMethod {
        match self {
            Self::Get => HttpMethod::Get,
            Self::Post => HttpMethod::Post,
            Self::Put => HttpMethod::Put,
            Self::Patch => HttpMethod::Patch,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Method name as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.to_http().as_str()
    }
}

/// Endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and optional base path.
    pub base_url: String,
    /// Path appended to `base_url`.
    #[serde(default)]
    pub path: String,
    /// HTTP method.
    #[serde(default)]
    pub method: ApiMethod,
    /// Headers sent with every call.
    #[serde(default, alias = "static_headers")]
    pub headers: IndexMap<String, String>,
    /// Query parameters sent with every call.
    #[serde(default, alias = "static_query_params")]
    pub params: IndexMap<String, String>,
    /// Authentication.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout", alias = "timeout_seconds")]
    pub timeout: f64,
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

impl ApiConfig {
    /// Creates a GET endpoint without auth.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: String::new(),
            method: ApiMethod::Get,
            headers: IndexMap::new(),
            params: IndexMap::new(),
            auth: AuthConfig::default(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: ApiMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a static header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a static query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the authentication.
    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn timeout(mut self, seconds: f64) -> Self {
        self.timeout = seconds;
        self
    }
}

/// How credentials are attached to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// No credential.
    #[default]
    None,
    /// Secret in a header (default `X-API-Key`).
    ApiKeyHeader,
    /// Secret in a query parameter (default `apikey`).
    ApiKeyQuery,
    /// `Authorization: Bearer <secret>`.
    Bearer,
    /// Accepted but not implemented; no credential is sent.
    Oauth2,
}

impl AuthMethod {
    /// Short label used in LLM tool context.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKeyHeader => "api_key_header",
            Self::ApiKeyQuery => "api_key_query",
            Self::Bearer => "bearer",
            Self::Oauth2 => "oauth2",
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Credential placement.
    #[serde(default)]
    pub method: AuthMethod,
    /// Header or query parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// `${ENV_VAR}` reference or literal secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,
}

impl AuthConfig {
    /// No authentication.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Bearer token auth.
    pub fn bearer(secret_ref: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Bearer,
            key_name: None,
            secret_ref: Some(secret_ref.into()),
        }
    }

    /// API key in a header.
    pub fn api_key_header(key_name: impl Into<String>, secret_ref: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::ApiKeyHeader,
            key_name: Some(key_name.into()),
            secret_ref: Some(secret_ref.into()),
        }
    }

    /// API key in the query string.
    pub fn api_key_query(key_name: impl Into<String>, secret_ref: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::ApiKeyQuery,
            key_name: Some(key_name.into()),
            secret_ref: Some(secret_ref.into()),
        }
    }
}

/// Field mappings between tool arguments, the request and the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Input field -> query parameter name.
    #[serde(default)]
    pub input_to_params: IndexMap<String, String>,
    /// Input field -> JSON body field.
    #[serde(default)]
    pub input_to_body: IndexMap<String, String>,
    /// Output field -> dotted path inside the response object.
    #[serde(default)]
    pub response_to_output: IndexMap<String, String>,
    /// Dotted path selecting the response object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_path: Option<String>,
}

impl FieldMapping {
    /// Maps an input field to a query parameter.
    #[must_use]
    pub fn param(mut self, input: impl Into<String>, param: impl Into<String>) -> Self {
        self.input_to_params.insert(input.into(), param.into());
        self
    }

    /// Maps an input field to a body field.
    #[must_use]
    pub fn body(mut self, input: impl Into<String>, field: impl Into<String>) -> Self {
        self.input_to_body.insert(input.into(), field.into());
        self
    }

    /// Maps a response path to an output field.
    #[must_use]
    pub fn output(mut self, output: impl Into<String>, path: impl Into<String>) -> Self {
        self.response_to_output.insert(output.into(), path.into());
        self
    }

    /// Sets the response path.
    #[must_use]
    pub fn response_path(mut self, path: impl Into<String>) -> Self {
        self.response_path = Some(path.into());
        self
    }
}
