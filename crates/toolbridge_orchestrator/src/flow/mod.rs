//! Multi-step flows chaining orchestrator runs.
//!
//! Each step runs one [`AiOrchestrator`] turn. Its output is stored as
//! `step_N_output` and later steps can reference it in their input or see
//! it in their instructions.

mod resolve;
mod types;

pub use resolve::{previous_results, resolve_input, step_key};
pub use types::{FlowDefinition, FlowResult, FlowStep, FlowStepKind};

use crate::ai::{AiOrchestrator, DEFAULT_MAX_TOOL_ITERATIONS};
use crate::workflow::WorkflowStatus;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use toolbridge_models::llm::Llm;
use toolbridge_tools::ToolRegistry;

/// Runs [`FlowDefinition`]s against a registry.
#[derive(Debug, Clone)]
pub struct FlowOrchestrator {
    llm: Llm,
    registry: Arc<ToolRegistry>,
    max_tool_iterations: usize,
}

impl FlowOrchestrator {
    /// Creates a runner whose orchestrate steps draw tools from `registry`.
    #[must_use]
    pub fn new(llm: Llm, registry: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            registry,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Sets the iteration bound of each step's orchestrator.
    #[must_use]
    pub fn with_max_tool_iterations(mut self, iterations: usize) -> Self {
        self.max_tool_iterations = iterations;
        self
    }

    /// Runs `flow` from `initial_input`.
    ///
    /// `initial_context` seeds the values step inputs may reference. The
    /// first failing step stops the flow; outputs of the steps before it
    /// are kept in the result.
    pub async fn execute(
        &self,
        flow: &FlowDefinition,
        initial_input: &str,
        initial_context: Option<Map<String, Value>>,
    ) -> FlowResult {
        tracing::info!(flow = %flow.name, steps = flow.steps.len(), "starting flow");

        let mut context = initial_context.unwrap_or_default();
        context.insert(step_key(0), Value::String(initial_input.to_string()));
        let mut step_outputs = IndexMap::new();

        for (index, step) in flow.steps.iter().enumerate() {
            let n = index + 1;
            tracing::info!(flow = %flow.name, step = n, total = flow.steps.len(), kind = ?step.kind, "executing step");

            let input = match &step.inputs {
                Some(inputs) => resolve_input(inputs, &context),
                None => Value::String(initial_input.to_string()),
            };
            let output = match self.run_step(step, input, &context).await {
                Ok(output) => output,
                Err(error) => {
                    tracing::error!(flow = %flow.name, step = n, error = %error, "flow step failed");
                    return FlowResult {
                        status: WorkflowStatus::Error,
                        result: None,
                        steps_executed: step_outputs.len(),
                        step_outputs,
                        error: Some(format!("Step {n} failed: {error}")),
                    };
                }
            };

            context.insert(step_key(n), output.clone());
            step_outputs.insert(step_key(n), output);
        }

        let result = step_outputs
            .last()
            .map_or_else(|| Value::String(initial_input.to_string()), |(_, value)| value.clone());
        tracing::info!(flow = %flow.name, "flow completed");
        FlowResult {
            status: WorkflowStatus::Success,
            result: Some(result),
            steps_executed: step_outputs.len(),
            step_outputs,
            error: None,
        }
    }

    async fn run_step(
        &self,
        step: &FlowStep,
        input: Value,
        context: &Map<String, Value>,
    ) -> Result<Value, String> {
        let registry = match step.kind {
            FlowStepKind::Orchestrate => {
                let (scoped, missing) = self.registry.subset(&step.tool_ids);
                if !missing.is_empty() {
                    return Err(format!("Tools not found in registry: {missing:?}"));
                }
                tracing::debug!(tools = scoped.len(), "orchestrating with step tools");
                scoped
            }
            FlowStepKind::Prompt => ToolRegistry::new(),
        };

        let results = previous_results(context);
        let instructions = match (&step.instructions, results.is_empty()) {
            (Some(instructions), true) => Some(instructions.clone()),
            (Some(instructions), false) => Some(format!("{instructions}\n\n{results}")),
            (None, false) => Some(results),
            (None, true) => None,
        };

        let input = match input {
            Value::String(text) => text,
            other => other.to_string(),
        };

        let orchestrator = AiOrchestrator::new(self.llm.clone(), Arc::new(registry))
            .with_max_tool_iterations(self.max_tool_iterations);
        let output = orchestrator
            .run(input, instructions.as_deref(), Vec::new())
            .await
            .map_err(|err| err.to_string())?;
        Ok(output.to_json())
    }
}
