//! Example workflow CLI.
//!
//! Sends a request to the registered tools, either through the five-stage
//! workflow (the model writes the HTTP request) or, with `--call`, through
//! LLM function calling.
//!
//! # Usage
//!
//! ```bash
//! workflow [--call] <instructions> [tool_id...]
//! ```
//!
//! # Example
//!
//! ```bash
//! workflow "What is IBM trading at?" get_stock_quote
//! workflow --call "How many words are in 'to be or not to be'?"
//! ```

use example::build_engine;
use toolbridge_core::Settings;
use toolbridge_orchestrator::{OrchestratorOutput, WorkflowRequest};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    settings.tracing_config().init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let call_mode = args.first().is_some_and(|arg| arg == "--call");
    if call_mode {
        args.remove(0);
    }
    let Some(instructions) = args.first().cloned() else {
        eprintln!("Usage: workflow [--call] <instructions> [tool_id...]");
        eprintln!("Example: workflow \"What is IBM trading at?\" get_stock_quote");
        std::process::exit(1);
    };

    let engine = match build_engine(&settings) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if call_mode {
        match engine.ai_orchestrator().run(instructions, None, Vec::new()).await {
            Ok(OrchestratorOutput::Response(response)) => println!("{}", response.text()),
            Ok(output) => {
                for outcome in output.tool_results() {
                    println!("{}: {}", outcome.tool_name, outcome.result.to_llm_output());
                }
            }
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    let mut tool_ids: Vec<String> = args.into_iter().skip(1).collect();
    if tool_ids.is_empty() {
        tool_ids = engine.registry().list_tools();
    }
    let request = WorkflowRequest::new(instructions, tool_ids).formatted(None);
    let response = engine.workflow_orchestrator().execute(&request).await;

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("Error: {err}"),
    }
    if !response.is_success() {
        std::process::exit(2);
    }
}
