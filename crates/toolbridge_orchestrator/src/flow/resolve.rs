//! Step input references and the earlier-results block.

use serde_json::{Map, Value};

/// Key under which the output of step `n` is stored. Step 0 is the
/// flow's initial input.
#[must_use]
pub fn step_key(n: usize) -> String {
    format!("step_{n}_output")
}

/// Replaces `${key}` and `${key.field}` strings with context values.
///
/// Arrays and objects are resolved element by element. An unknown key
/// leaves the reference string as-is. A field lookup on an object yields
/// `null` when the field is absent; on any other value it yields the value
/// itself.
#[must_use]
pub fn resolve_input(input: &Value, context: &Map<String, Value>) -> Value {
    match input {
        Value::String(text) => resolve_reference(text, context).unwrap_or_else(|| input.clone()),
        Value::Array(items) => Value::Array(items.iter().map(|item| resolve_input(item, context)).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), resolve_input(value, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn resolve_reference(text: &str, context: &Map<String, Value>) -> Option<Value> {
    let reference = text.strip_prefix("${")?.strip_suffix('}')?;
    match reference.split_once('.') {
        Some((key, field)) => Some(match context.get(key) {
            Some(Value::Object(fields)) => fields.get(field).cloned().unwrap_or(Value::Null),
            Some(value) => value.clone(),
            None => Value::Null,
        }),
        None => context.get(reference).cloned(),
    }
}

/// Renders the outputs of completed steps, excluding step 0, in step order.
///
/// Empty when no step has completed.
#[must_use]
pub fn previous_results(context: &Map<String, Value>) -> String {
    let mut outputs: Vec<(usize, &Value)> = context
        .iter()
        .filter_map(|(key, value)| {
            let n = key.strip_prefix("step_")?.strip_suffix("_output")?.parse().ok()?;
            (n > 0).then_some((n, value))
        })
        .collect();
    if outputs.is_empty() {
        return String::new();
    }
    outputs.sort_by_key(|(n, _)| *n);

    let sections: Vec<String> = outputs
        .into_iter()
        .map(|(n, value)| format!("Step {n} Output:\n{}", render(value)))
        .collect();
    format!("Previous step results:\n\n{}", sections.join("\n\n"))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Map<String, Value> {
        match json!({
            "step_0_output": "quote IBM",
            "step_1_output": {"output_text": "IBM is at 150", "price": 150.25},
            "step_2_output": "plain",
            "region": "us"
        }) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn references_resolve_whole_values_and_fields() {
        let ctx = context();
        assert_eq!(resolve_input(&json!("${step_0_output}"), &ctx), json!("quote IBM"));
        assert_eq!(resolve_input(&json!("${step_1_output.price}"), &ctx), json!(150.25));
        assert_eq!(resolve_input(&json!("${step_1_output.volume}"), &ctx), Value::Null);
        assert_eq!(resolve_input(&json!("${step_2_output.anything}"), &ctx), json!("plain"));
        assert_eq!(resolve_input(&json!("${region}"), &ctx), json!("us"));
    }

    #[test]
    fn unknown_references_and_literals_pass_through() {
        let ctx = context();
        assert_eq!(resolve_input(&json!("${step_9_output}"), &ctx), json!("${step_9_output}"));
        assert_eq!(resolve_input(&json!("price is ${step_1_output}"), &ctx), json!("price is ${step_1_output}"));
        assert_eq!(resolve_input(&json!(42), &ctx), json!(42));
    }

    #[test]
    fn nested_inputs_are_resolved() {
        let resolved = resolve_input(
            &json!({"summary": "${step_1_output.output_text}", "items": ["${step_2_output}", 1]}),
            &context(),
        );
        assert_eq!(resolved, json!({"summary": "IBM is at 150", "items": ["plain", 1]}));
    }

    #[test]
    fn previous_results_skip_initial_input_and_sort_numerically() {
        let mut ctx = context();
        ctx.insert(step_key(10), json!("tenth"));
        let rendered = previous_results(&ctx);

        assert!(rendered.starts_with("Previous step results:\n\nStep 1 Output:\n{\n"));
        assert!(!rendered.contains("quote IBM"));
        assert!(!rendered.contains("region"));
        let second = rendered.find("Step 2 Output:\nplain").unwrap();
        let tenth = rendered.find("Step 10 Output:\ntenth").unwrap();
        assert!(second < tenth);
    }

    #[test]
    fn no_completed_steps_renders_nothing() {
        let mut ctx = Map::new();
        ctx.insert(step_key(0), json!("start"));
        assert_eq!(previous_results(&ctx), "");
    }
}
