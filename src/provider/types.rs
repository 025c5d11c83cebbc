//! OpenAI chat-completions wire types
//!
//! Request and streaming-response structures for the upstream provider.
//! Only the fields this gateway reads are modeled; everything else in a
//! frame is ignored by serde.

use serde::{Deserialize, Serialize};

/// One role-tagged turn in a conversation prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "system", "user", or "assistant"
    pub role: String,
    /// Turn text
    pub content: String,
}

impl ChatTurn {
    /// Create a turn with an arbitrary role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Request body for a streaming chat completion
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Ordered prompt turns, system first
    pub messages: Vec<ChatTurn>,
    /// Output token ceiling
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Always true for this gateway
    pub stream: bool,
}

/// One incremental frame of a streaming completion response
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    /// Candidate list; the gateway only reads the first entry
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

impl StreamChunk {
    /// Extract the incremental text fragment, if this frame carries one
    pub fn into_fragment(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}

/// A single streamed choice
#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    /// Incremental delta for this choice
    #[serde(default)]
    pub delta: Delta,
}

/// Incremental content delta
#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    /// Text fragment, absent on role-announcement and terminal frames
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_extracted_from_delta() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#).unwrap();
        assert_eq!(chunk.into_fragment(), Some("Hel".to_string()));
    }

    #[test]
    fn role_announcement_frame_has_no_fragment() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(chunk.into_fragment(), None);
    }

    #[test]
    fn finish_frame_has_no_fragment() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.into_fragment(), None);
    }

    #[test]
    fn empty_choices_has_no_fragment() {
        let chunk: StreamChunk = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(chunk.into_fragment(), None);
    }
}
