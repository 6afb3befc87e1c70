//! Prompt texts for the two prompting modes.

/// Builds the system and user prompts sent by [`PromptService`](super::PromptService).
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTemplates;

impl PromptTemplates {
    /// System prompt for free-text answers.
    pub const NORMAL_SYSTEM_PROMPT: &'static str = "You are a helpful AI assistant. Provide clear, accurate, and concise responses to user questions.\nFocus on being informative and easy to understand.";

    /// System prompt for HTTP request generation.
    pub const MCP_SYSTEM_PROMPT: &'static str = "You are an API integration assistant. Your task is to generate HTTP request specifications based on user instructions and API documentation.\n\nAlways respond with a valid HTTP request specification including:\n- method: The HTTP method (GET, POST, PUT, DELETE, PATCH)\n- url: The complete URL for the request\n- headers: Any required headers as a dictionary\n- query_params: URL query parameters as a dictionary (if applicable)\n- body: Request body data (if applicable)\n\nBe precise and follow the API documentation exactly.";

    /// Joins the non-empty sections of a user prompt.
    #[must_use]
    pub fn build_user_prompt(
        instructions: &str,
        context: Option<&str>,
        api_docs: Option<&str>,
        response_format: Option<&str>,
    ) -> String {
        let mut parts = vec![format!("Instructions: {instructions}")];
        if let Some(context) = non_empty(context) {
            parts.push(format!("\nContext: {context}"));
        }
        if let Some(docs) = non_empty(api_docs) {
            parts.push(format!("\nAPI Documentation:\n{docs}"));
        }
        if let Some(format) = non_empty(response_format) {
            parts.push(format!("\nResponse Format: {format}"));
        }
        parts.join("\n")
    }

    /// `(system, user)` prompts for normal mode.
    #[must_use]
    pub fn normal_mode_prompt(
        instructions: &str,
        context: Option<&str>,
        response_format: Option<&str>,
    ) -> (String, String) {
        (
            Self::NORMAL_SYSTEM_PROMPT.to_string(),
            Self::build_user_prompt(instructions, context, None, response_format),
        )
    }

    /// `(system, user)` prompts for MCP mode.
    #[must_use]
    pub fn mcp_mode_prompt(
        instructions: &str,
        api_docs: &str,
        response_format: Option<&str>,
    ) -> (String, String) {
        (
            Self::MCP_SYSTEM_PROMPT.to_string(),
            Self::build_user_prompt(instructions, None, Some(api_docs), response_format),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_only_has_instructions_by_default() {
        assert_eq!(
            PromptTemplates::build_user_prompt("say hi", None, None, None),
            "Instructions: say hi"
        );
    }

    #[test]
    fn user_prompt_sections_are_ordered() {
        let prompt = PromptTemplates::build_user_prompt(
            "get quote",
            Some("user is in EU"),
            Some("GET /quote"),
            Some("json"),
        );
        assert_eq!(
            prompt,
            "Instructions: get quote\n\nContext: user is in EU\n\nAPI Documentation:\nGET /quote\n\nResponse Format: json"
        );
    }

    #[test]
    fn empty_sections_are_dropped() {
        let (system, user) = PromptTemplates::normal_mode_prompt("x", Some(""), None);
        assert!(system.starts_with("You are a helpful AI assistant."));
        assert_eq!(user, "Instructions: x");
    }

    #[test]
    fn mcp_prompt_carries_docs() {
        let (system, user) = PromptTemplates::mcp_mode_prompt("x", "Available Tools:", None);
        assert!(system.contains("HTTP request specification"));
        assert!(user.contains("API Documentation:\nAvailable Tools:"));
    }
}
