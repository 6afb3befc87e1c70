//! JSON Schema normalization for strict structured-output APIs.

use serde_json::Value;

/// Supported string formats for strict JSON Schema validation.
const SUPPORTED_FORMATS: &[&str] = &[
    "date-time",
    "time",
    "date",
    "duration",
    "email",
    "hostname",
    "uri",
    "ipv4",
    "ipv6",
    "uuid",
];

/// Keywords rejected by strict mode.
const UNSUPPORTED_PROPS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "default",
    "$schema",
    "title",
];

/// Normalizes a JSON schema for strict mode APIs.
///
/// This function:
/// - Sets `additionalProperties: false` on all object types.
/// - Lists every property under `required` (strict mode needs all of them;
///   optional fields are expressed as nullable types instead).
/// - Removes unsupported keywords like `minimum`, `maxLength`, `default`.
/// - Filters string formats to only supported values.
/// - Removes `minItems` values greater than 1.
/// - Removes external `$ref` URLs (only internal refs are supported).
pub fn normalize_schema_for_strict_mode(mut schema: Value) -> Value {
    if let Value::Array(ref mut arr) = schema {
        for item in arr.iter_mut() {
            *item = normalize_schema_for_strict_mode(item.take());
        }
        return schema;
    }

    let Value::Object(ref mut obj) = schema else {
        return schema;
    };

    for prop in UNSUPPORTED_PROPS {
        if obj.remove(*prop).is_some() {
            tracing::debug!(
                property = *prop,
                "removed unsupported JSON schema keyword for strict mode"
            );
        }
    }

    match obj.get("format").map(Value::as_str) {
        Some(Some(format)) if SUPPORTED_FORMATS.contains(&format) => {}
        Some(format) => {
            tracing::warn!(format = ?format, "removed unsupported string format for strict mode");
            obj.remove("format");
        }
        None => {}
    }

    if let Some(min_items) = obj.get("minItems")
        && min_items.as_u64().is_none_or(|n| n > 1)
    {
        tracing::warn!(min_items = %min_items, "removed minItems constraint unsupported in strict mode");
        obj.remove("minItems");
    }

    let is_object = obj.get("type") == Some(&Value::String("object".to_string()))
        || obj.contains_key("properties");

    if is_object {
        obj.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    if let Some(Value::Object(props)) = obj.get_mut("properties") {
        let names: Vec<Value> = props.keys().cloned().map(Value::String).collect();
        for value in props.values_mut() {
            *value = normalize_schema_for_strict_mode(value.take());
        }
        obj.insert("required".to_string(), Value::Array(names));
    }

    if let Some(items) = obj.get_mut("items") {
        *items = normalize_schema_for_strict_mode(items.take());
    }

    for key in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(arr)) = obj.get_mut(key) {
            for item in arr.iter_mut() {
                *item = normalize_schema_for_strict_mode(item.take());
            }
        }
    }

    for key in ["$defs", "definitions"] {
        if let Some(Value::Object(defs)) = obj.get_mut(key) {
            for value in defs.values_mut() {
                *value = normalize_schema_for_strict_mode(value.take());
            }
        }
    }

    if let Some(ref_str) = obj.get("$ref").and_then(Value::as_str)
        && (ref_str.starts_with("http://") || ref_str.starts_with("https://"))
    {
        tracing::warn!(
            ref_url = ref_str,
            "removed external $ref URL (only internal refs supported in strict mode)"
        );
        obj.remove("$ref");
    }

    schema
}
