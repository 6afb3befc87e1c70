//! Multi-step flows against a scripted model.

mod common;

use common::{ScriptedProvider, messages_json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use toolbridge_orchestrator::{FlowDefinition, FlowOrchestrator, FlowStep, WorkflowStatus};
use toolbridge_tools::{ToolError, ToolRegistry, make_typed_tool};

#[derive(Debug, Deserialize, JsonSchema)]
struct AddInput {
    a: i64,
    b: i64,
}

#[derive(Debug, Serialize, JsonSchema)]
struct AddOutput {
    sum: i64,
}

fn flows(provider: &Arc<ScriptedProvider>) -> FlowOrchestrator {
    let registry = Arc::new(ToolRegistry::new());
    let add = make_typed_tool("add", "Add two integers", |input: AddInput| async move {
        Ok::<_, ToolError>(AddOutput { sum: input.a + input.b })
    })
    .expect("schema should convert");
    registry.register(add).expect("add should register");
    FlowOrchestrator::new(provider.llm(), registry)
}

#[tokio::test]
async fn steps_chain_through_earlier_outputs() {
    let provider = ScriptedProvider::new();
    provider.push_tool_calls(&[("add", json!({"a": 2, "b": 3}))]);
    provider.push_text("The sum is 5.");
    let flow = FlowDefinition::new("add_then_explain")
        .step(FlowStep::orchestrate(["add"]).with_instructions("Use the add tool."))
        .step(
            FlowStep::prompt("Explain the result.")
                .with_inputs(json!({"question": "${step_0_output}", "calls": "${step_1_output.tool_calls}"})),
        );

    let result = flows(&provider).execute(&flow, "what is 2 + 3?", None).await;

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.steps_executed, 2);
    let first = &result.step_outputs["step_1_output"];
    assert_eq!(first["tool_calls"][0]["name"], "add");
    assert_eq!(first["tool_results"][0]["data"], json!({"sum": 5}));
    assert_eq!(result.result.as_ref().unwrap()["output_text"], "The sum is 5.");

    let requests = provider.requests();
    assert_eq!(requests[0].system.as_deref(), Some("Use the add tool."));
    assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));

    let second = &requests[1];
    let system = second.system.as_deref().unwrap();
    assert!(system.starts_with("Explain the result.\n\nPrevious step results:\n\nStep 1 Output:\n"));
    assert!(system.contains("\"sum\": 5"));
    assert!(second.tools.as_ref().is_none_or(Vec::is_empty));
    let input = messages_json(second);
    assert!(input.contains("what is 2 + 3?"));
    assert!(input.contains("add"));
}

#[tokio::test]
async fn steps_without_inputs_receive_the_initial_input() {
    let provider = ScriptedProvider::new();
    provider.push_text("first");
    provider.push_text("second");
    let flow = FlowDefinition::new("twice")
        .step(FlowStep::prompt("One."))
        .step(FlowStep::prompt("Two."));

    let result = flows(&provider)
        .execute(&flow, "original question", None)
        .await;

    assert!(result.is_success());
    for request in provider.requests() {
        assert!(messages_json(&request).contains("original question"));
    }
    let keys: Vec<&String> = result.step_outputs.keys().collect();
    assert_eq!(keys, ["step_1_output", "step_2_output"]);
}

#[tokio::test]
async fn initial_context_is_available_to_inputs() {
    let provider = ScriptedProvider::new();
    provider.push_text("done");
    let mut context = serde_json::Map::new();
    context.insert("region".to_string(), json!("eu-west"));
    let flow = FlowDefinition::new("scoped").step(FlowStep::prompt("Report.").with_inputs("${region}"));

    let result = flows(&provider).execute(&flow, "ignored", Some(context)).await;

    assert!(result.is_success());
    assert!(messages_json(&provider.requests()[0]).contains("eu-west"));
}

#[tokio::test]
async fn missing_tools_stop_the_flow_and_keep_earlier_outputs() {
    let provider = ScriptedProvider::new();
    provider.push_text("step one");
    let flow = FlowDefinition::new("broken")
        .step(FlowStep::prompt("First."))
        .step(FlowStep::orchestrate(["add", "get_weather"]))
        .step(FlowStep::prompt("Never runs."));

    let result = flows(&provider).execute(&flow, "go", None).await;

    assert_eq!(result.status, WorkflowStatus::Error);
    assert_eq!(result.steps_executed, 1);
    assert_eq!(result.result, None);
    assert!(result.step_outputs.contains_key("step_1_output"));
    let error = result.error.unwrap();
    assert!(error.starts_with("Step 2 failed: Tools not found in registry"));
    assert!(error.contains("get_weather"));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn model_failures_are_reported_per_step() {
    let provider = ScriptedProvider::new();
    provider.push_error("upstream down");
    let flow = FlowDefinition::new("failing").step(FlowStep::orchestrate(["add"]));

    let result = flows(&provider).execute(&flow, "go", None).await;

    assert_eq!(result.status, WorkflowStatus::Error);
    assert_eq!(result.steps_executed, 0);
    assert!(result.error.unwrap().starts_with("Step 1 failed: "));
}

#[tokio::test]
async fn empty_flows_return_the_initial_input() {
    let provider = ScriptedProvider::new();

    let result = flows(&provider)
        .execute(&FlowDefinition::new("noop"), "unchanged", None)
        .await;

    assert!(result.is_success());
    assert_eq!(result.steps_executed, 0);
    assert_eq!(result.result, Some(json!("unchanged")));
    assert_eq!(provider.request_count(), 0);
}
