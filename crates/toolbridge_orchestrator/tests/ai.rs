//! Tool-calling orchestrator against a scripted model.

mod common;

use common::ScriptedProvider;
use futures::StreamExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use toolbridge_models::llm::{
    ExtractionError, GenerationError, Message, StreamEvent, ToolResult, ToolResultStatus,
    UserBlock,
};
use toolbridge_orchestrator::{AiOrchestrator, OrchestratorOutput, ToolCallOutcome};
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

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
struct Verdict {
    approved: bool,
    reason: String,
}

fn orchestrator(provider: &Arc<ScriptedProvider>) -> AiOrchestrator {
    let registry = Arc::new(ToolRegistry::new());
    let add = make_typed_tool("add", "Add two integers", |input: AddInput| async move {
        Ok::<_, ToolError>(AddOutput { sum: input.a + input.b })
    })
    .expect("schema should convert");
    registry.register(add).expect("add should register");
    AiOrchestrator::new(provider.llm(), registry)
}

#[tokio::test]
async fn plain_answer_is_returned_as_is() {
    let provider = ScriptedProvider::new();
    provider.push_text("Hello!");
    let ai = orchestrator(&provider);

    let output = ai.run("hi", Some("Be brief."), Vec::new()).await.unwrap();

    let OrchestratorOutput::Response(response) = output else {
        panic!("expected a plain response");
    };
    assert_eq!(response.text(), "Hello!");

    let request = &provider.requests()[0];
    assert_eq!(request.system.as_deref(), Some("Be brief."));
    let tools = request.tools.as_ref().expect("registry tools are offered");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "add");
}

#[tokio::test]
async fn requested_calls_are_executed_once_in_order() {
    let provider = ScriptedProvider::new();
    provider.push_tool_calls(&[
        ("add", json!({"a": 2, "b": 3})),
        ("missing_tool", json!({})),
        ("add", json!(r#"{"a": 10, "b": -4}"#)),
    ]);
    let ai = orchestrator(&provider);

    let output = ai.run("do math", None, Vec::new()).await.unwrap();

    let results = output.tool_results();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].tool_name, "add");
    assert_eq!(results[0].call_id.as_deref(), Some("call_0"));
    assert_eq!(results[0].result.data, Some(json!({"sum": 5})));
    assert!(!results[1].result.success);
    assert_eq!(results[1].result.error.as_deref(), Some("Tool 'missing_tool' not found"));
    assert_eq!(results[2].result.data, Some(json!({"sum": 6})));

    // Results are not sent back to the model.
    assert_eq!(provider.request_count(), 1);

    let follow_up: Vec<Message> = results.iter().filter_map(ToolCallOutcome::to_message).collect();
    assert_eq!(follow_up.len(), 3);
    let Message::User { content } = &follow_up[1] else {
        panic!("tool results are user messages");
    };
    assert!(matches!(
        &content[0],
        UserBlock::ToolResult(ToolResult { status: ToolResultStatus::Error, .. })
    ));
}

#[tokio::test]
async fn extra_tools_are_offered_alongside_registry() {
    let provider = ScriptedProvider::new();
    provider.push_text("ok");
    let ai = orchestrator(&provider);

    let extra = toolbridge_models::llm::ToolDefinition {
        name: "lookup".to_string(),
        description: "Look something up".to_string(),
        parameters: json!({"type": "object", "properties": {}}),
    };
    ai.run(vec![Message::user("hi")], None, vec![extra]).await.unwrap();

    let names: Vec<String> = provider.requests()[0]
        .tools
        .iter()
        .flatten()
        .map(|tool| tool.name.clone())
        .collect();
    assert_eq!(names, ["add", "lookup"]);
}

#[tokio::test]
async fn model_errors_propagate() {
    let provider = ScriptedProvider::new();
    provider.push_error("boom");
    let ai = orchestrator(&provider);

    let err = ai.run("hi", None, Vec::new()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Http(_)));
}

#[tokio::test]
async fn structured_output_is_typed() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({"approved": true, "reason": "looks fine"}));
    let ai = orchestrator(&provider);

    let verdict: Verdict = ai.run_with_tool_loop("review this", None).await.unwrap();

    assert_eq!(
        verdict,
        Verdict {
            approved: true,
            reason: "looks fine".to_string()
        }
    );
    assert!(provider.requests()[0].output_schema.is_some());
}

#[tokio::test]
async fn zero_iterations_never_calls_the_model() {
    let provider = ScriptedProvider::new();
    let ai = orchestrator(&provider).with_max_tool_iterations(0);

    let err = ai.run_with_tool_loop::<Verdict>("review", None).await.unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::GenerationError(GenerationError::InvalidRequest(_))
    ));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn structured_value_uses_raw_schema() {
    let provider = ScriptedProvider::new();
    provider.push_json(&json!({"city": "Oslo"}));
    let ai = orchestrator(&provider);
    let schema = json!({
        "type": "object",
        "properties": {"city": {"type": "string"}},
        "required": ["city"]
    });

    let value = ai.run_structured_value("where?", None, schema.clone()).await.unwrap();

    assert_eq!(value, json!({"city": "Oslo"}));
    assert_eq!(provider.requests()[0].output_schema, Some(schema));
}

#[tokio::test]
async fn manual_execution_bypasses_the_model() {
    let provider = ScriptedProvider::new();
    let ai = orchestrator(&provider);

    let result = ai.execute_tool_manually("add", json!({"a": 1, "b": 1})).await;

    assert!(result.success);
    assert_eq!(result.data, Some(json!({"sum": 2})));
    assert_eq!(ai.available_tools(), ["add"]);
    assert_eq!(ai.model(), "scripted-model");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn stream_yields_text_and_calls_without_executing_them() {
    let provider = ScriptedProvider::new();
    provider.push_tool_calls(&[("add", json!({"a": 1, "b": 2}))]);
    let ai = orchestrator(&provider);

    let stream = ai.stream("add 1 and 2", Some("Use tools."), Vec::new()).await.unwrap();
    let events: Vec<StreamEvent> = stream.map(|event| event.unwrap()).collect().await;

    assert!(matches!(events.first(), Some(StreamEvent::Start { .. })));
    let calls: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::ToolCall(call) => Some(call.function.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(calls, ["add"]);
    assert!(matches!(events.last(), Some(StreamEvent::Completed(_))));

    assert_eq!(provider.request_count(), 1);
    let request = &provider.requests()[0];
    assert_eq!(request.system.as_deref(), Some("Use tools."));
    assert_eq!(request.tools.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn stream_surfaces_open_errors() {
    let provider = ScriptedProvider::new();
    provider.push_error("unreachable");
    let ai = orchestrator(&provider);

    let err = ai.stream("hi", None, Vec::new()).await.err().expect("stream should fail to open");
    assert!(matches!(err, GenerationError::Http(_)));
}
