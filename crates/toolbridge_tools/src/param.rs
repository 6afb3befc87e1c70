//! Typed access to a tool call's arguments.

use crate::error::ToolError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A function call request with name and JSON parameters.
///
/// Handlers of [`FunctionTool`](crate::FunctionTool)s receive one of these
/// after the arguments passed schema validation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Parameters as a JSON object map.
    pub parameters: Map<String, Value>,
}

impl FunctionCall {
    /// Creates a new function call.
    pub fn new(name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Creates a function call from a [`Value`]. `null` becomes an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if `parameters` is neither an
    /// object nor `null`.
    pub fn from_value(name: impl Into<String>, parameters: Value) -> Result<Self, ToolError> {
        match parameters {
            Value::Object(map) => Ok(Self::new(name, map)),
            Value::Null => Ok(Self::new(name, Map::new())),
            _ => Err(ToolError::parameter_error("Parameters must be an object")),
        }
    }

    /// Deserializes a required parameter by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if the parameter is missing or
    /// has the wrong shape.
    pub fn get_param<T: DeserializeOwned>(&self, name: &str) -> Result<T, ToolError> {
        let value = self
            .parameters
            .get(name)
            .ok_or_else(|| ToolError::parameter_error(format!("Missing parameter: {name}")))?;

        serde_json::from_value(value.clone()).map_err(|err| {
            ToolError::parameter_error(format!("Failed to deserialize parameter '{name}': {err}"))
        })
    }

    /// Deserializes an optional parameter by name. Returns `None` if missing or null.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if the parameter is present but
    /// has the wrong shape.
    pub fn get_optional_param<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ToolError> {
        match self.parameters.get(name) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|err| {
                    ToolError::parameter_error(format!(
                        "Failed to deserialize parameter '{name}': {err}"
                    ))
                }),
        }
    }

    /// Deserializes the whole argument object into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if the arguments do not fit `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.parameters.clone())).map_err(|err| {
            ToolError::parameter_error(format!("Failed to deserialize arguments: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call() -> FunctionCall {
        FunctionCall::from_value("quote", json!({"symbol": "IBM", "limit": 3, "note": null}))
            .unwrap()
    }

    #[test]
    fn required_params() {
        let call = call();
        assert_eq!(call.get_param::<String>("symbol").unwrap(), "IBM");
        assert!(matches!(
            call.get_param::<String>("missing"),
            Err(ToolError::ParameterError(msg)) if msg == "Missing parameter: missing"
        ));
        assert!(call.get_param::<u32>("symbol").is_err());
    }

    #[test]
    fn optional_params() {
        let call = call();
        assert_eq!(call.get_optional_param::<u32>("limit").unwrap(), Some(3));
        assert_eq!(call.get_optional_param::<String>("note").unwrap(), None);
        assert_eq!(call.get_optional_param::<String>("absent").unwrap(), None);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(FunctionCall::from_value("x", json!("text")).is_err());
        assert!(FunctionCall::from_value("x", Value::Null).unwrap().parameters.is_empty());
    }
}
