//! Typed schema descriptions and the structural validator.
//!
//! [`ToolSchema`] models the JSON-Schema subset tools use (`type`,
//! `properties`, `required`) and keeps any other keywords verbatim in
//! `extra`. [`validate_input`] is the one place arguments are checked.

use crate::error::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────

/// JSON value types understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// `"string"`
    String,
    /// `"number"`; integers are accepted.
    Number,
    /// `"integer"`; whole-valued floats are accepted.
    Integer,
    /// `"boolean"`
    Boolean,
    /// `"array"`
    Array,
    /// `"object"`
    Object,
    /// `"null"`
    Null,
}

impl JsonType {
    /// Schema keyword for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// The narrowest type describing `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns `true` if `value` conforms to this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => as_whole_number(value).is_some(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Null => value.is_null(),
        }
    }
}

impl core::fmt::Display for JsonType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `type` keyword: one type or a union such as `["string", "null"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    /// A single type.
    Single(JsonType),
    /// Any of several types.
    Union(Vec<JsonType>),
}

impl TypeSpec {
    /// Returns `true` if any member type accepts `value`.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        self.types().iter().any(|kind| kind.accepts(value))
    }

    /// Returns `true` if `kind` is one of the member types.
    #[must_use]
    pub fn includes(&self, kind: JsonType) -> bool {
        self.types().contains(&kind)
    }

    /// First non-null member type, used for value coercion.
    #[must_use]
    pub fn primary(&self) -> Option<JsonType> {
        self.types().iter().copied().find(|kind| *kind != JsonType::Null)
    }

    fn types(&self) -> &[JsonType] {
        match self {
            Self::Single(kind) => core::slice::from_ref(kind),
            Self::Union(kinds) => kinds,
        }
    }
}

impl From<JsonType> for TypeSpec {
    fn from(kind: JsonType) -> Self {
        Self::Single(kind)
    }
}

impl core::fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.types().iter().map(|kind| kind.as_str()).collect();
        f.write_str(&names.join("|"))
    }
}

/// Schema of a single property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Declared type; absent means any value.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TypeSpec>,
    /// Human-readable description shown to the LLM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining keywords (`enum`, `items`, `format`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertySchema {
    /// Creates a property of the given type.
    #[must_use]
    pub fn new(kind: JsonType) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Type name for display; `"any"` when undeclared.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.kind
            .as_ref()
            .map_or_else(|| "any".to_string(), ToString::to_string)
    }
}

/// Schema of a tool's input or output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Top-level type, `object` unless stated otherwise.
    #[serde(rename = "type", default = "object_type")]
    pub kind: TypeSpec,
    /// Declared properties, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    /// Names of required properties.
    #[serde(default)]
    pub required: Vec<String>,
    /// Remaining keywords (`additionalProperties`, `$defs`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn object_type() -> TypeSpec {
    TypeSpec::Single(JsonType::Object)
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self::object()
    }
}

impl ToolSchema {
    /// An object schema without properties.
    #[must_use]
    pub fn object() -> Self {
        Self {
            kind: object_type(),
            properties: IndexMap::new(),
            required: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Adds an optional property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Adds a required property.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    /// Returns `true` if this schema describes JSON objects.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.kind.includes(JsonType::Object)
    }

    /// Returns `true` if `name` is listed as required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }

    /// Parses a schema from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a schema object or uses an
    /// unknown `type`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serializes the schema to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    fn allows_unknown_fields(&self) -> bool {
        self.properties.is_empty()
            || self
                .extra
                .get("additionalProperties")
                .is_some_and(|value| *value != Value::Bool(false))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────

/// Validates tool arguments against an input schema.
///
/// Returns the normalized argument object:
/// - `null` arguments are treated as an empty object;
/// - fields not declared in `properties` are dropped, unless the schema
///   declares no properties or allows additional properties;
/// - whole-valued floats given for `integer` fields become integers.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every missing required field and
/// every type mismatch.
pub fn validate_input(
    schema: &ToolSchema,
    arguments: &Value,
) -> Result<Map<String, Value>, ValidationError> {
    let empty = Map::new();
    let args = match arguments {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::new(format!(
                "arguments must be a JSON object, got {}",
                JsonType::of(other)
            )));
        }
    };

    let mut problems = Vec::new();

    for name in &schema.required {
        if args.get(name).is_none_or(Value::is_null) {
            problems.push(format!("missing required field '{name}'"));
        }
    }

    let mut validated = Map::new();
    for (name, value) in args {
        let Some(property) = schema.properties.get(name) else {
            if schema.allows_unknown_fields() {
                validated.insert(name.clone(), value.clone());
            }
            continue;
        };

        if value.is_null() {
            if !schema.is_required(name) {
                validated.insert(name.clone(), Value::Null);
            }
            continue;
        }

        match &property.kind {
            Some(kind) if !kind.accepts(value) => problems.push(format!(
                "field '{name}' expected {kind}, got {}",
                JsonType::of(value)
            )),
            Some(kind) if kind.primary() == Some(JsonType::Integer) => {
                let normalized = as_whole_number(value).map_or_else(|| value.clone(), Value::from);
                validated.insert(name.clone(), normalized);
            }
            _ => {
                validated.insert(name.clone(), value.clone());
            }
        }
    }

    if problems.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationError { problems })
    }
}

/// Best-effort check of a tool's return value against its output schema.
///
/// Only the top-level type is compared. Returns a description of the
/// mismatch, if any; callers log it and keep the value.
#[must_use]
pub fn check_output(schema: &ToolSchema, value: &Value) -> Option<String> {
    if schema.kind.accepts(value) {
        None
    } else {
        Some(format!(
            "expected {}, got {}",
            schema.kind,
            JsonType::of(value)
        ))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "only whole values within the exact f64 range are converted"
)]
fn as_whole_number(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    let float = number.as_f64()?;
    (float.fract() == 0.0 && float.abs() < 9.0e15).then_some(float as i64)
}
