//! Renders registered tools as API documentation for the model.

use toolbridge_tools::{ApiTool, AuthMethod, RegisteredTool, ToolSchema};

/// Documentation block listing `tools`.
///
/// Config-backed tools also describe their endpoint, so the model can
/// write a request for them directly.
pub fn render_tool_context(tools: &[RegisteredTool]) -> String {
    if tools.is_empty() {
        return "No tools available.".to_string();
    }

    let mut parts = vec!["Available Tools:\n".to_string()];
    for registered in tools {
        let definition = &registered.definition;
        parts.push(format!("\nTool: {}", definition.name));
        parts.push(format!("Description: {}", definition.description));

        if let Some(api) = registered.tool.as_api_tool() {
            parts.extend(endpoint_lines(api));
        }

        if !definition.input_schema.properties.is_empty() {
            parts.push("Required Parameters:".to_string());
            parts.extend(parameter_lines(&definition.input_schema));
        }

        if !definition.output_schema.properties.is_empty() {
            parts.push("Expected Output:".to_string());
            for (name, property) in &definition.output_schema.properties {
                parts.push(format!("  - {name} ({})", property.type_name()));
            }
        }
    }

    parts.push(
        "\nUse the exact endpoint URL listed for the selected tool. Do not invent hosts or paths."
            .to_string(),
    );
    let context = parts.join("\n");
    tracing::debug!(tools = tools.len(), chars = context.len(), "rendered tool context");
    context
}

fn parameter_lines(schema: &ToolSchema) -> impl Iterator<Item = String> + '_ {
    schema.properties.iter().map(|(name, property)| {
        let marker = if schema.is_required(name) { "required" } else { "optional" };
        let description = property.description.as_deref().unwrap_or("No description");
        format!("  - {name} ({}) ({marker}): {description}", property.type_name())
    })
}

fn endpoint_lines(api: &ApiTool) -> Vec<String> {
    let spec = api.spec();
    let mut lines = vec![format!(
        "Endpoint: {} {}",
        spec.api.method.as_str(),
        api.build_url()
    )];

    if !spec.api.params.is_empty() {
        let params = spec
            .api
            .params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Fixed Query Parameters: {params}"));
    }

    let mapping = &spec.mapping;
    let routes: Vec<String> = mapping
        .input_to_params
        .iter()
        .map(|(input, param)| format!("{input} -> query '{param}'"))
        .chain(
            mapping
                .input_to_body
                .iter()
                .map(|(input, field)| format!("{input} -> body '{field}'")),
        )
        .collect();
    if !routes.is_empty() {
        lines.push(format!("Parameter Placement: {}", routes.join(", ")));
    }

    let auth = &spec.api.auth;
    let requirement = match auth.method {
        AuthMethod::None => "none".to_string(),
        AuthMethod::Oauth2 => "oauth2, no credential is sent".to_string(),
        method => {
            let location = match method {
                AuthMethod::ApiKeyQuery => format!(
                    "query parameter '{}'",
                    auth.key_name.as_deref().unwrap_or("apikey")
                ),
                AuthMethod::ApiKeyHeader => {
                    format!("header '{}'", auth.key_name.as_deref().unwrap_or("X-API-Key"))
                }
                _ => "Authorization header".to_string(),
            };
            format!(
                "{} via {location}; credentials are added automatically, omit them",
                method.as_str()
            )
        }
    };
    lines.push(format!("Authentication: {requirement}"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use toolbridge_http::HttpClientService;
    use toolbridge_tools::{
        JsonType, PropertySchema, Tool, ToolKind, ToolSchema, example_stock_quote_spec, make_tool,
    };

    fn stock_tool() -> RegisteredTool {
        let api = ApiTool::new(example_stock_quote_spec(), HttpClientService::default());
        let kind = ToolKind::from(api);
        RegisteredTool {
            definition: kind.definition(),
            tool: Arc::new(kind),
        }
    }

    #[test]
    fn empty_set_has_placeholder() {
        assert_eq!(render_tool_context(&[]), "No tools available.");
    }

    #[test]
    fn config_tool_lists_endpoint_and_schema() {
        let context = render_tool_context(&[stock_tool()]);
        assert!(context.starts_with("Available Tools:\n"));
        assert!(context.contains("\nTool: get_stock_quote\n"));
        assert!(context.contains("Endpoint: GET https://www.alphavantage.co/query"));
        assert!(context.contains("Fixed Query Parameters: function=GLOBAL_QUOTE"));
        assert!(context.contains("Authentication: api_key_query via query parameter 'apikey'"));
        assert!(context.contains("Required Parameters:\n  - symbol (string) (required):"));
        assert!(context.contains("Expected Output:\n  - symbol (string)"));
        assert!(!context.contains("${ALPHA_VANTAGE_API_KEY}"));
        assert!(context.contains("Use the exact endpoint URL"));
    }

    #[test]
    fn function_tool_has_no_endpoint() {
        let schema = ToolSchema::object()
            .property("text", PropertySchema::new(JsonType::String));
        let tool = make_tool("echo", "Echo text", schema, ToolSchema::object(), |call| async move {
            Ok(serde_json::Value::Object(call.parameters))
        });
        let kind = ToolKind::from(tool);
        let registered = RegisteredTool {
            definition: kind.definition(),
            tool: Arc::new(kind),
        };

        let context = render_tool_context(&[registered]);
        assert!(!context.contains("Endpoint:"));
        assert!(context.contains("  - text (string) (optional): No description"));
    }
}
