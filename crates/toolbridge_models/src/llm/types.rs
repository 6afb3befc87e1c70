//! Provider-neutral request, response and message types.
//!
//! Providers translate these to and from their wire formats; the tool
//! layers only ever see these shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────
// Request / Response
// ─────────────────────

/// One model turn: instructions, conversation, offered tools and an
/// optional output schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Instructions placed before the conversation.
    pub system: Option<String>,
    /// Conversation, oldest first.
    pub messages: Vec<Message>,
    /// Functions offered to the model; `None` offers nothing.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Tool selection constraint.
    pub tool_choice: Option<ToolChoice>,
    /// JSON Schema the reply must conform to.
    ///
    /// Filled in by [`Llm::generate_structured`](super::Llm::generate_structured).
    pub output_schema: Option<Value>,
}

impl GenerationRequest {
    /// A request holding a single user message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use toolbridge_models::llm::GenerationRequest;
    ///
    /// let request = GenerationRequest::new("What's the price of IBM?");
    /// ```
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(message)],
            ..Self::default()
        }
    }

    /// A request with instructions and a single user message.
    #[must_use]
    pub fn with_system(system: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            messages: vec![Message::user(message)],
            ..Self::default()
        }
    }

    /// Sets the instructions.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Prepends earlier turns to the conversation.
    #[must_use]
    pub fn history(mut self, mut messages: Vec<Message>) -> Self {
        messages.append(&mut self.messages);
        self.messages = messages;
        self
    }

    /// Offers one more tool.
    #[must_use]
    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.get_or_insert_with(Vec::new).push(tool);
        self
    }

    /// Replaces the offered tools; an empty list offers none.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Constrains tool selection.
    #[must_use]
    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

/// What the model produced for one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Provider response id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Output blocks in emission order.
    pub content: Vec<AssistantBlock>,
    /// Token accounting.
    pub usage: Usage,
}

impl GenerationResponse {
    /// Concatenated text blocks; empty when the model only called tools.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantBlock::Text(block) => Some(block.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Function calls, in output order.
    #[must_use]
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantBlock::ToolCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

/// Token counts reported by the provider, when available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: Option<u64>,
    /// Completion tokens.
    pub output_tokens: Option<u64>,
    /// Sum of both.
    pub total_tokens: Option<u64>,
}

// ─────────────────────
// Messages
// ─────────────────────

/// A conversation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// User input, including tool results.
    User {
        /// Blocks of the message.
        content: Vec<UserBlock>,
    },
    /// Earlier model output.
    Assistant {
        /// Provider message id.
        id: Option<String>,
        /// Blocks of the message.
        content: Vec<AssistantBlock>,
    },
}

impl Message {
    /// A text user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: vec![UserBlock::text(text)],
        }
    }

    /// A text assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            id: None,
            content: vec![AssistantBlock::text(text)],
        }
    }

    /// A successful tool result for `call_id`.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::tool_outcome(call_id, output, ToolResultStatus::Success)
    }

    /// A tool result for `call_id` with an explicit status.
    #[must_use]
    pub fn tool_outcome(
        call_id: impl Into<String>,
        output: impl Into<String>,
        status: ToolResultStatus,
    ) -> Self {
        Self::User {
            content: vec![UserBlock::ToolResult(ToolResult {
                call_id: call_id.into(),
                output: output.into(),
                status,
            })],
        }
    }
}

// ─────────────────────
// Content Blocks
// ─────────────────────

/// A run of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content.
    pub text: String,
}

/// Block of a user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserBlock {
    /// Text.
    Text(TextBlock),
    /// Output of an executed function call.
    ToolResult(ToolResult),
}

impl UserBlock {
    /// A text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock { text: text.into() })
    }
}

/// Block of model output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantBlock {
    /// Text.
    Text(TextBlock),
    /// A requested function call.
    ToolCall(ToolCall),
    /// Reasoning summary.
    Reasoning(ReasoningBlock),
}

impl AssistantBlock {
    /// A text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock { text: text.into() })
    }

    /// A function call block.
    #[must_use]
    pub fn tool_call(call: ToolCall) -> Self {
        Self::ToolCall(call)
    }
}

/// Summary emitted by reasoning models; kept so it can be replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningBlock {
    /// Provider item id.
    pub id: Option<String>,
    /// Summary paragraphs.
    pub reasoning: Vec<String>,
}

// ─────────────────────
// Tool Calling
// ─────────────────────

/// A function offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Registry name, e.g. `get_stock_quote`.
    pub name: String,
    /// What the function does, shown to the model.
    pub description: String,
    /// Object schema of the arguments:
    ///
    /// ```json
    /// {
    ///   "type": "object",
    ///   "properties": {
    ///     "symbol": {"type": "string", "description": "Ticker symbol"}
    ///   },
    ///   "required": ["symbol"]
    /// }
    /// ```
    pub parameters: Value,
}

/// Tool selection constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Call tools or answer, at the model's discretion.
    Auto,
    /// Call at least one tool.
    Required,
    /// Call the named tool.
    Specific(String),
    /// Answer without tools.
    None,
}

/// A function call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Output item id.
    pub id: String,
    /// Id a [`ToolResult`] must echo back.
    pub call_id: Option<String>,
    /// Name and arguments.
    pub function: ToolFunction,
}

/// Function name and arguments of a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Registered tool name.
    pub name: String,
    /// Arguments object; some providers send it JSON-encoded as a string.
    pub arguments: Value,
}

/// Whether a tool result reports success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    /// The tool produced output.
    #[default]
    Success,
    /// The tool failed; `output` holds the message.
    Error,
}

/// Tool output returned to the model on a later turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The answered call's [`ToolCall::call_id`].
    pub call_id: String,
    /// Output text.
    pub output: String,
    /// Outcome.
    #[serde(default)]
    pub status: ToolResultStatus,
}
