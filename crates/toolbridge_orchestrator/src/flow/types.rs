//! Flow definitions and results.

use crate::workflow::WorkflowStatus;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a step talks to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStepKind {
    /// Model call with the step's tools; requested calls are executed.
    #[default]
    Orchestrate,
    /// Model call without tools.
    Prompt,
}

/// One step of a [`FlowDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowStep {
    /// Step kind.
    #[serde(default, rename = "type")]
    pub kind: FlowStepKind,
    /// Registry tools offered in an orchestrate step. Ignored for prompt steps.
    #[serde(default)]
    pub tool_ids: Vec<String>,
    /// Instructions for the model. Results of earlier steps are appended.
    #[serde(default)]
    pub instructions: Option<String>,
    /// Input for the step. Strings of the form `${step_N_output}` or
    /// `${step_N_output.field}` are replaced by earlier outputs, also
    /// inside arrays and objects. Defaults to the flow's initial input.
    #[serde(default)]
    pub inputs: Option<Value>,
}

impl FlowStep {
    /// An orchestrate step over `tool_ids`.
    #[must_use]
    pub fn orchestrate<I, S>(tool_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: FlowStepKind::Orchestrate,
            tool_ids: tool_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A tool-less prompt step.
    #[must_use]
    pub fn prompt(instructions: impl Into<String>) -> Self {
        Self {
            kind: FlowStepKind::Prompt,
            instructions: Some(instructions.into()),
            ..Self::default()
        }
    }

    /// Sets the instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sets the input, which may reference earlier outputs.
    #[must_use]
    pub fn with_inputs(mut self, inputs: impl Into<Value>) -> Self {
        self.inputs = Some(inputs.into());
        self
    }
}

/// A named sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    /// Flow name.
    pub name: String,
    /// What the flow does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps, run in order.
    #[serde(default)]
    pub steps: Vec<FlowStep>,
}

impl FlowDefinition {
    /// A flow without steps.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: FlowStep) -> Self {
        self.steps.push(step);
        self
    }
}

/// Outcome of [`FlowOrchestrator::execute`](super::FlowOrchestrator::execute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResult {
    /// Overall outcome.
    pub status: WorkflowStatus,
    /// Output of the last step, or the initial input for an empty flow.
    pub result: Option<Value>,
    /// Steps that completed.
    pub steps_executed: usize,
    /// `step_N_output` for each completed step, in execution order.
    pub step_outputs: IndexMap<String, Value>,
    /// Failure description.
    pub error: Option<String>,
}

impl FlowResult {
    /// Returns `true` if every step completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == WorkflowStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn steps_default_to_orchestrate() {
        let flow: FlowDefinition = serde_json::from_value(json!({
            "name": "quote_then_summary",
            "steps": [
                {"tool_ids": ["get_stock_quote"]},
                {"type": "prompt", "instructions": "Summarize.", "inputs": "${step_1_output.output_text}"}
            ]
        }))
        .unwrap();

        assert_eq!(flow.steps[0].kind, FlowStepKind::Orchestrate);
        assert_eq!(flow.steps[0].inputs, None);
        assert_eq!(flow.steps[1].kind, FlowStepKind::Prompt);
        assert_eq!(flow.steps[1].inputs, Some(json!("${step_1_output.output_text}")));
    }
}
