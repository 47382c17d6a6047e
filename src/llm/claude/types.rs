//! Claude-specific request and response types
//!
//! These types map directly to the Anthropic Messages API schema.

use serde::{Deserialize, Serialize};

/// Request body for `POST /messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Model identifier, e.g. `claude-sonnet-4-5`
    pub model: String,
    /// Maximum number of tokens to generate (required)
    pub max_tokens: u32,
    /// Alternating user/assistant turns, starting with a user turn
    pub messages: Vec<ClaudeMessage>,
    /// System prompt (top-level field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Temperature (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p nucleus sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Always true for streaming
    pub stream: bool,
}

/// A single message in the Claude conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Plain text content
    pub content: String,
}

/// SSE event types from Claude streaming API
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeStreamEvent {
    /// Message streaming started
    MessageStart { message: ClaudeMessageData },
    /// Content block started
    ContentBlockStart {
        index: usize,
        content_block: serde_json::Value,
    },
    /// Content block delta (incremental update)
    ContentBlockDelta {
        index: usize,
        delta: ClaudeContentDelta,
    },
    /// Content block stopped
    ContentBlockStop { index: usize },
    /// Message delta (metadata update)
    MessageDelta {
        delta: ClaudeMessageDeltaData,
        usage: Option<ClaudeUsage>,
    },
    /// Message streaming stopped
    MessageStop,
    /// Ping event (keep-alive)
    Ping,
    /// Error event
    Error { error: ClaudeErrorData },
}

/// Message data from message_start event
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessageData {
    /// Message ID
    pub id: String,
    /// Message role (always "assistant" for responses)
    pub role: String,
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Initial usage metadata
    #[serde(default)]
    pub usage: ClaudeUsage,
}

/// Content delta (incremental update)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentDelta {
    /// Text delta
    TextDelta { text: String },
    /// Anything else (thinking, signatures, tool input); not relayed
    #[serde(other)]
    Other,
}

/// Message delta data
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessageDeltaData {
    /// Stop reason (set when message completes)
    pub stop_reason: Option<String>,
}

/// Usage metadata
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ClaudeUsage {
    /// Input tokens consumed (not present in message_delta updates)
    #[serde(default)]
    pub input_tokens: u32,
    /// Output tokens generated
    #[serde(default)]
    pub output_tokens: u32,
}

/// Error data
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeErrorData {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_skips_unset() {
        let request = MessagesRequest {
            model: "claude-haiku-4-5".to_string(),
            max_tokens: 1024,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            system: None,
            temperature: Some(0.7),
            top_p: None,
            stream: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-haiku-4-5");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["stream"], true);
        assert!(json.get("system").is_none());
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn test_unknown_delta_type() {
        let event: ClaudeStreamEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"hm"}}"#,
        )
        .unwrap();
        match event {
            ClaudeStreamEvent::ContentBlockDelta { delta, .. } => {
                assert!(matches!(delta, ClaudeContentDelta::Other))
            }
            _ => panic!("Expected ContentBlockDelta"),
        }
    }
}
