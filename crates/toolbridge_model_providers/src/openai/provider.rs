//! `OpenAI` [`LlmProvider`] implementation using the Responses API.

use crate::schema::normalize_schema_for_strict_mode;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::responses::{
    CreateResponseArgs, EasyInputContent, EasyInputMessage, FunctionCallOutput,
    FunctionCallOutputItemParam, FunctionTool, FunctionToolCall, InputContent, InputItem,
    InputParam, InputTextContent, Item, OutputItem, OutputMessageContent, ReasoningItem,
    Response, ResponseFormatJsonSchema, ResponseTextParam, ResponseUsage, Role, SummaryPart,
    SummaryTextContent, TextResponseFormatConfiguration, Tool, ToolChoiceFunction,
    ToolChoiceOptions, ToolChoiceParam,
};
use async_trait::async_trait;
use toolbridge_models::llm::{
    AssistantBlock, GenerationError, GenerationRequest, GenerationResponse, LlmProvider, Message,
    ReasoningBlock, TextBlock, ToolCall, ToolChoice, ToolFunction, ToolResultStatus, Usage,
    UserBlock,
};

/// `OpenAI` [`LlmProvider`] implementation using the Responses API.
pub struct OpenAiProvider {
    client: async_openai::Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Creates a new provider with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: async_openai::Client::with_config(config),
        }
    }

    /// Points the client at a different API base URL.
    #[must_use]
    pub fn with_api_base(self, api_base: impl Into<String>) -> Self {
        let config = self.client.config().clone().with_api_base(api_base);
        Self {
            client: async_openai::Client::with_config(config),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        model: &str,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let create_response = convert_request(model, &request)?;
        tracing::debug!(
            model,
            tools = request.tools.as_ref().map_or(0, Vec::len),
            structured = request.output_schema.is_some(),
            "sending OpenAI responses request"
        );
        let response = self
            .client
            .responses()
            .create(create_response)
            .await
            .map_err(convert_error)?;
        convert_response(response)
    }
}

// ---------------------------------------------------------------------------
// Request conversion (toolbridge -> OpenAI)
// ---------------------------------------------------------------------------

fn convert_request(
    model: &str,
    request: &GenerationRequest,
) -> Result<async_openai::types::responses::CreateResponse, GenerationError> {
    let input_items = convert_messages(&request.messages)?;

    let tools: Option<Vec<Tool>> = request.tools.as_ref().map(|tools| {
        tools
            .iter()
            .map(|tool| {
                Tool::Function(FunctionTool {
                    name: tool.name.clone(),
                    description: Some(tool.description.clone()),
                    parameters: Some(normalize_schema_for_strict_mode(tool.parameters.clone())),
                    strict: Some(true),
                })
            })
            .collect()
    });

    let tool_choice = request.tool_choice.as_ref().map(convert_tool_choice);

    let text = request.output_schema.as_ref().map(|schema| ResponseTextParam {
        format: TextResponseFormatConfiguration::JsonSchema(ResponseFormatJsonSchema {
            name: "structured_output".to_string(),
            description: None,
            schema: Some(normalize_schema_for_strict_mode(schema.clone())),
            strict: Some(true),
        }),
        verbosity: None,
    });

    let mut builder = CreateResponseArgs::default();
    builder.model(model).input(InputParam::Items(input_items));

    if let Some(system) = &request.system {
        builder.instructions(system.clone());
    }
    if let Some(tools) = tools {
        builder.tools(tools);
    }
    if let Some(tool_choice) = tool_choice {
        builder.tool_choice(tool_choice);
    }
    if let Some(text) = text {
        builder.text(text);
    }

    builder.build().map_err(|build_err| {
        GenerationError::InvalidRequest(format!("Failed to build CreateResponse: {build_err}"))
    })
}

fn convert_messages(messages: &[Message]) -> Result<Vec<InputItem>, GenerationError> {
    let mut items = Vec::new();

    for message in messages {
        match message {
            Message::User { content } => convert_user_message(content, &mut items),
            Message::Assistant { content, .. } => {
                convert_assistant_message(content, &mut items)?;
            }
        }
    }

    Ok(items)
}

fn convert_user_message(blocks: &[UserBlock], items: &mut Vec<InputItem>) {
    // Tool results become top-level items; text is grouped into one message.
    let mut content_parts: Vec<InputContent> = Vec::new();

    for block in blocks {
        match block {
            UserBlock::Text(block) => {
                content_parts.push(InputContent::InputText(InputTextContent {
                    text: block.text.clone(),
                }));
            }
            UserBlock::ToolResult(result) => {
                flush_content_parts(&mut content_parts, Role::User, items);

                let output = match result.status {
                    ToolResultStatus::Success => result.output.clone(),
                    ToolResultStatus::Error => format!("Error: {}", result.output),
                };

                items.push(InputItem::Item(Item::FunctionCallOutput(
                    FunctionCallOutputItemParam {
                        call_id: result.call_id.clone(),
                        output: FunctionCallOutput::Text(output),
                        id: None,
                        status: None,
                    },
                )));
            }
        }
    }

    flush_content_parts(&mut content_parts, Role::User, items);
}

fn convert_assistant_message(
    blocks: &[AssistantBlock],
    items: &mut Vec<InputItem>,
) -> Result<(), GenerationError> {
    let mut text_parts: Vec<InputContent> = Vec::new();

    for block in blocks {
        match block {
            AssistantBlock::Text(block) => {
                text_parts.push(InputContent::InputText(InputTextContent {
                    text: block.text.clone(),
                }));
            }
            AssistantBlock::ToolCall(call) => {
                flush_content_parts(&mut text_parts, Role::Assistant, items);

                let arguments =
                    serde_json::to_string(&call.function.arguments).map_err(|json_err| {
                        GenerationError::InvalidRequest(format!(
                            "Failed to serialize tool call arguments: {json_err}"
                        ))
                    })?;

                let call_id = call.call_id.clone().ok_or_else(|| {
                    GenerationError::InvalidRequest(
                        "Tool call is missing a call_id, which OpenAI needs to link calls to outputs"
                            .to_string(),
                    )
                })?;

                items.push(InputItem::Item(Item::FunctionCall(FunctionToolCall {
                    call_id,
                    name: call.function.name.clone(),
                    arguments,
                    id: Some(call.id.clone()),
                    status: None,
                })));
            }
            AssistantBlock::Reasoning(reasoning) => {
                flush_content_parts(&mut text_parts, Role::Assistant, items);

                let summary = reasoning
                    .reasoning
                    .iter()
                    .map(|text| SummaryPart::SummaryText(SummaryTextContent { text: text.clone() }))
                    .collect();

                items.push(InputItem::Item(Item::Reasoning(ReasoningItem {
                    id: reasoning.id.clone().unwrap_or_default(),
                    summary,
                    content: None,
                    encrypted_content: None,
                    status: None,
                })));
            }
        }
    }

    flush_content_parts(&mut text_parts, Role::Assistant, items);

    Ok(())
}

/// Moves accumulated content parts into one [`EasyInputMessage`].
fn flush_content_parts(parts: &mut Vec<InputContent>, role: Role, items: &mut Vec<InputItem>) {
    if parts.is_empty() {
        return;
    }

    let content = match parts.as_slice() {
        [InputContent::InputText(text_content)] => EasyInputContent::Text(text_content.text.clone()),
        _ => EasyInputContent::ContentList(core::mem::take(parts)),
    };

    items.push(InputItem::EasyMessage(EasyInputMessage {
        content,
        role,
        r#type: Default::default(),
    }));

    parts.clear();
}

fn convert_tool_choice(choice: &ToolChoice) -> ToolChoiceParam {
    match choice {
        ToolChoice::Auto => ToolChoiceParam::Mode(ToolChoiceOptions::Auto),
        ToolChoice::Required => ToolChoiceParam::Mode(ToolChoiceOptions::Required),
        ToolChoice::None => ToolChoiceParam::Mode(ToolChoiceOptions::None),
        ToolChoice::Specific(name) => {
            ToolChoiceParam::Function(ToolChoiceFunction { name: name.clone() })
        }
    }
}

// ---------------------------------------------------------------------------
// Response conversion (OpenAI -> toolbridge)
// ---------------------------------------------------------------------------

fn convert_response(response: Response) -> Result<GenerationResponse, GenerationError> {
    let content = response
        .output
        .into_iter()
        .map(convert_output_item)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let usage = response.usage.map(convert_usage).unwrap_or_default();

    Ok(GenerationResponse {
        id: Some(response.id),
        content,
        usage,
    })
}

fn convert_output_item(item: OutputItem) -> Result<Vec<AssistantBlock>, GenerationError> {
    match item {
        OutputItem::Message(msg) => msg
            .content
            .into_iter()
            .map(convert_output_message_content)
            .collect::<Result<Vec<_>, _>>(),
        OutputItem::FunctionCall(call) => {
            // Unparseable arguments are kept verbatim so the executor can
            // report them as invalid input.
            let arguments = match serde_json::from_str(&call.arguments) {
                Ok(arguments) => arguments,
                Err(err) => {
                    tracing::warn!(
                        tool = %call.name,
                        error = %err,
                        "tool call arguments are not valid JSON"
                    );
                    serde_json::Value::String(call.arguments)
                }
            };

            Ok(vec![AssistantBlock::ToolCall(ToolCall {
                id: call.id.unwrap_or_default(),
                call_id: Some(call.call_id),
                function: ToolFunction {
                    name: call.name,
                    arguments,
                },
            })])
        }
        OutputItem::Reasoning(reasoning) => {
            let texts: Vec<String> = reasoning
                .summary
                .into_iter()
                .map(|part| {
                    let SummaryPart::SummaryText(text_content) = part;
                    text_content.text
                })
                .collect();

            if texts.is_empty() {
                Ok(vec![])
            } else {
                Ok(vec![AssistantBlock::Reasoning(ReasoningBlock {
                    id: Some(reasoning.id),
                    reasoning: texts,
                })])
            }
        }
        other => {
            tracing::warn!(
                item = ?other,
                "dropping unsupported OpenAI output item"
            );
            Ok(vec![])
        }
    }
}

fn convert_output_message_content(
    content: OutputMessageContent,
) -> Result<AssistantBlock, GenerationError> {
    match content {
        OutputMessageContent::OutputText(text) => {
            Ok(AssistantBlock::Text(TextBlock { text: text.text }))
        }
        OutputMessageContent::Refusal(refusal) => Err(GenerationError::Refusal(refusal.refusal)),
    }
}

fn convert_usage(usage: ResponseUsage) -> Usage {
    Usage {
        input_tokens: Some(u64::from(usage.input_tokens)),
        output_tokens: Some(u64::from(usage.output_tokens)),
        total_tokens: Some(u64::from(usage.total_tokens)),
    }
}

// ---------------------------------------------------------------------------
// Error conversion
// ---------------------------------------------------------------------------

fn convert_error(err: OpenAIError) -> GenerationError {
    match err {
        OpenAIError::ApiError(api_err) => GenerationError::Provider {
            status: None,
            message: api_err.message.clone(),
            source: Some(Box::new(OpenAIError::ApiError(api_err))),
        },
        OpenAIError::Reqwest(ref reqwest_err) => match reqwest_err.status() {
            Some(reqwest::StatusCode::UNAUTHORIZED) => GenerationError::Auth(err.to_string()),
            Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => {
                GenerationError::RateLimited { retry_after: None }
            }
            _ => GenerationError::Http(err.to_string()),
        },
        OpenAIError::JSONDeserialize(serde_err, ref _body) => GenerationError::Json(serde_err),
        OpenAIError::InvalidArgument(msg) => GenerationError::InvalidRequest(msg),
        _ => GenerationError::Provider {
            status: None,
            message: err.to_string(),
            source: Some(Box::new(err)),
        },
    }
}
