//! Building config-backed tools from specs, JSON values, strings and files.

use crate::api::ApiTool;
use crate::error::{RegistrationError, ToolError};
use crate::registry::ToolRegistry;
use crate::schema::{JsonType, PropertySchema, ToolSchema};
use crate::spec::{ApiConfig, AuthConfig, FieldMapping, ToolSpec};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use toolbridge_http::HttpClientService;

/// Errors raised while loading or registering a tool spec.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The spec file could not be read.
    #[error("failed to read tool spec: {0}")]
    Io(#[from] std::io::Error),

    /// The spec document is malformed.
    #[error("invalid tool spec JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The spec parsed but cannot be used.
    #[error("{0}")]
    Configuration(#[from] ToolError),

    /// The registry refused the tool.
    #[error("{0}")]
    Registration(#[from] RegistrationError),
}

/// Creates [`ApiTool`]s that share one [`HttpClientService`].
#[derive(Debug, Clone, Default)]
pub struct ToolFactory {
    http: HttpClientService,
}

impl ToolFactory {
    /// Creates a factory whose tools use `http`.
    #[must_use]
    pub fn new(http: HttpClientService) -> Self {
        Self { http }
    }

    /// Validates a spec and wraps it in an [`ApiTool`].
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Configuration`] if the spec is invalid or
    /// disabled.
    pub fn create_from_spec(&self, spec: ToolSpec) -> Result<ApiTool, FactoryError> {
        spec.validate()?;
        if !spec.enabled {
            return Err(ToolError::configuration(format!("tool '{}' is disabled", spec.name)).into());
        }
        tracing::info!(tool = %spec.name, version = spec.version, "creating tool from spec");
        Ok(ApiTool::new(spec, self.http.clone()))
    }

    /// Parses a spec from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Json`] if the value is not a valid spec, plus
    /// the errors of [`create_from_spec`](Self::create_from_spec).
    pub fn create_from_value(&self, value: Value) -> Result<ApiTool, FactoryError> {
        self.create_from_spec(serde_json::from_value(value)?)
    }

    /// Parses a spec from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`create_from_value`](Self::create_from_value).
    pub fn create_from_json_str(&self, json: &str) -> Result<ApiTool, FactoryError> {
        self.create_from_spec(serde_json::from_str(json)?)
    }

    /// Reads a spec from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Io`] if the file cannot be read, plus the
    /// errors of [`create_from_json_str`](Self::create_from_json_str).
    pub fn create_from_json_file(&self, path: impl AsRef<Path>) -> Result<ApiTool, FactoryError> {
        let contents = std::fs::read_to_string(path)?;
        self.create_from_json_str(&contents)
    }

    /// Creates a tool from `spec` and registers it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`create_from_spec`](Self::create_from_spec) and
    /// [`FactoryError::Registration`] if the name is taken.
    pub fn register_config_tool(
        &self,
        registry: &ToolRegistry,
        spec: ToolSpec,
    ) -> Result<(), FactoryError> {
        let tool = self.create_from_spec(spec)?;
        registry.register(tool)?;
        Ok(())
    }
}

/// The Alpha Vantage `GLOBAL_QUOTE` stock quote tool.
///
/// Reads its key from `${ALPHA_VANTAGE_API_KEY}`.
#[must_use]
pub fn example_stock_quote_spec() -> ToolSpec {
    let api = ApiConfig::new("https://www.alphavantage.co/query")
        .param("function", "GLOBAL_QUOTE")
        .auth(AuthConfig::api_key_query("apikey", "${ALPHA_VANTAGE_API_KEY}"))
        .timeout(30.0);

    let input = ToolSchema::object().required_property(
        "symbol",
        PropertySchema::new(JsonType::String)
            .with_description("Stock ticker symbol (e.g., IBM, AAPL)"),
    );

    let output = ToolSchema::object()
        .required_property("symbol", PropertySchema::new(JsonType::String))
        .required_property("price", PropertySchema::new(JsonType::Number))
        .property("change", PropertySchema::new(JsonType::Number))
        .property("change_percent", PropertySchema::new(JsonType::String))
        .property("volume", PropertySchema::new(JsonType::Integer))
        .property("latest_trading_day", PropertySchema::new(JsonType::String));

    let mapping = FieldMapping::default()
        .param("symbol", "symbol")
        .response_path("Global Quote")
        .output("symbol", "01. symbol")
        .output("price", "05. price")
        .output("change", "09. change")
        .output("change_percent", "10. change percent")
        .output("volume", "06. volume")
        .output("latest_trading_day", "07. latest trading day");

    ToolSpec::new(
        "get_stock_quote",
        "Get real-time stock quote from Alpha Vantage API",
        api,
    )
    .with_input_schema(input)
    .with_output_schema(output)
    .with_mapping(mapping)
    .with_tag("finance")
    .with_tag("stocks")
    .with_tag("market-data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::AuthMethod;
    use crate::tool::Tool;

    #[test]
    fn stock_quote_spec_is_complete() {
        let spec = example_stock_quote_spec();
        assert_eq!(spec.name, "get_stock_quote");
        assert_eq!(spec.api.params["function"], "GLOBAL_QUOTE");
        assert_eq!(spec.api.auth.method, AuthMethod::ApiKeyQuery);
        assert_eq!(spec.mapping.response_path.as_deref(), Some("Global Quote"));
        assert_eq!(spec.mapping.response_to_output["price"], "05. price");
        assert_eq!(spec.output_schema.properties.len(), 6);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn creates_from_each_source() {
        let factory = ToolFactory::default();
        let document = serde_json::to_value(example_stock_quote_spec()).unwrap();

        let from_value = factory.create_from_value(document.clone()).unwrap();
        let from_str = factory.create_from_json_str(&document.to_string()).unwrap();
        assert_eq!(from_value.definition(), from_str.definition());

        let path = std::env::temp_dir().join(format!("toolbridge-spec-{}.json", std::process::id()));
        std::fs::write(&path, document.to_string()).unwrap();
        let from_file = factory.create_from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(from_file.spec().name, "get_stock_quote");
    }

    #[test]
    fn refuses_bad_specs() {
        let factory = ToolFactory::default();

        let mut disabled = example_stock_quote_spec();
        disabled.enabled = false;
        assert!(matches!(
            factory.create_from_spec(disabled),
            Err(FactoryError::Configuration(ToolError::Configuration(_)))
        ));

        let blank = ToolSpec::new("blank", "", ApiConfig::new(""));
        assert!(matches!(factory.create_from_spec(blank), Err(FactoryError::Configuration(_))));

        assert!(matches!(factory.create_from_json_str("{"), Err(FactoryError::Json(_))));
        assert!(matches!(
            factory.create_from_json_file("/definitely/not/here.json"),
            Err(FactoryError::Io(_))
        ));
    }

    #[test]
    fn registration_conflicts_surface() {
        let factory = ToolFactory::default();
        let registry = ToolRegistry::new();
        factory.register_config_tool(&registry, example_stock_quote_spec()).unwrap();
        assert!(matches!(
            factory.register_config_tool(&registry, example_stock_quote_spec()),
            Err(FactoryError::Registration(RegistrationError::AlreadyRegistered(_)))
        ));
    }
}
