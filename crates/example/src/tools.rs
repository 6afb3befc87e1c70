//! Tools registered by the demo.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use toolbridge_tools::{FunctionTool, ToolError, make_typed_tool};

/// Input of the `text_stats` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TextStatsInput {
    /// Text to analyse.
    pub text: String,
}

/// Output of the `text_stats` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TextStats {
    /// Whitespace-separated words.
    pub words: usize,
    /// Unicode scalar values.
    pub characters: usize,
    /// Lines, counting a trailing partial line.
    pub lines: usize,
}

/// Counts words, characters and lines.
#[must_use]
pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        words: text.split_whitespace().count(),
        characters: text.chars().count(),
        lines: text.lines().count(),
    }
}

/// A function-backed tool wrapping [`text_stats`].
///
/// # Errors
///
/// Returns [`ToolError`] if the generated schemas cannot be converted.
pub fn text_stats_tool() -> Result<FunctionTool, ToolError> {
    make_typed_tool(
        "text_stats",
        "Count the words, characters and lines of a text",
        |input: TextStatsInput| async move { Ok::<_, ToolError>(text_stats(&input.text)) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_lines() {
        assert_eq!(
            text_stats("hello world\nsecond line"),
            TextStats {
                words: 4,
                characters: 23,
                lines: 2
            }
        );
        assert_eq!(text_stats("").words, 0);
    }
}
