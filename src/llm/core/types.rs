//! Core types for the LLM abstraction layer

use serde::{Deserialize, Serialize};

use super::config::GenerationConfig;

/// Request to generate content from an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Provider-side model identifier
    pub model: String,
    /// Conversation history
    pub messages: Vec<Message>,
    /// Generation parameters
    pub config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>, config: GenerationConfig) -> Self {
        Self {
            model: model.into(),
            messages,
            config,
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Create a new system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions for the model
    System,
    /// Human input
    User,
    /// Model output
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Events emitted during streaming generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Response begins
    MessageStart { id: String },
    /// Incremental content update
    ContentDelta { index: usize, delta: ContentDelta },
    /// Response complete
    MessageEnd {
        finish_reason: FinishReason,
        usage: Option<UsageMetadata>,
    },
    /// Error reported by the provider inside an open stream
    Error { error: String },
}

/// Incremental content update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    /// Text token(s)
    TextDelta { text: String },
}

/// Reason why generation finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural completion
    EndTurn,
    /// Natural completion (alternative name)
    Stop,
    /// Hit token limit
    MaxTokens,
    /// Hit stop sequence
    StopSequence,
    /// Blocked by safety filters
    Safety,
    /// Provider-specific reason
    Other(String),
}

impl FinishReason {
    /// Map a provider stop reason string onto the common enum
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "end_turn" => FinishReason::EndTurn,
            "stop" => FinishReason::Stop,
            "max_tokens" | "length" => FinishReason::MaxTokens,
            "stop_sequence" => FinishReason::StopSequence,
            "content_filter" | "refusal" => FinishReason::Safety,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    /// Prompt tokens consumed
    pub input_tokens: u32,
    /// Response tokens generated
    pub output_tokens: u32,
    /// Sum of input and output
    pub total_tokens: u32,
}

impl UsageMetadata {
    /// Create new usage metadata
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Which wire protocol serves a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `/chat/completions` compatible endpoints (OpenAI, DashScope, vLLM, ...)
    OpenAiCompatible,
    /// Anthropic Messages API
    Anthropic,
}

/// A resolved model: the identifier sent upstream plus the provider serving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub provider: ProviderKind,
}

impl Model {
    /// Resolve a requested model name against the configured default.
    ///
    /// `claude-*` models are routed to the Anthropic provider only when it is
    /// available; otherwise every model goes through the OpenAI-compatible
    /// endpoint, which many gateways use to proxy Claude as well.
    pub fn resolve(requested: Option<&str>, default_model: &str, anthropic_enabled: bool) -> Self {
        let name = requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(default_model)
            .to_string();

        let provider = if anthropic_enabled && name.starts_with("claude-") {
            ProviderKind::Anthropic
        } else {
            ProviderKind::OpenAiCompatible
        };

        Self { name, provider }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}
