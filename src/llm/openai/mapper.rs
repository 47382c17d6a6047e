//! Mapping between abstraction types and OpenAI-compatible wire types

use crate::llm::core::types::{
    ContentDelta, FinishReason, GenerateRequest, StreamEvent, UsageMetadata,
};

use super::types::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};

/// Convert our abstraction request to a streaming chat completion request.
///
/// `max_tokens` is left to the endpoint's default: compatible gateways
/// disagree on the ceiling and reject values above it.
pub fn to_chat_request(request: GenerateRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: request.model,
        messages: request
            .messages
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role.as_str().to_string(),
                content: m.content,
            })
            .collect(),
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        stream: true,
    }
}

/// Per-stream mapping state
#[derive(Debug, Default)]
pub struct ChunkState {
    started: bool,
}

/// Convert one completion chunk into zero or more abstraction events
pub fn from_chunk(chunk: ChatCompletionChunk, state: &mut ChunkState) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if let Some(error) = chunk.error {
        let code = error
            .error_type
            .or_else(|| error.code.map(|c| c.to_string()))
            .unwrap_or_else(|| "error".to_string());
        events.push(StreamEvent::Error {
            error: format!("{}: {}", code, error.message),
        });
        return events;
    }

    if !state.started && !chunk.choices.is_empty() {
        state.started = true;
        events.push(StreamEvent::MessageStart {
            id: chunk.id.clone(),
        });
    }

    let usage = chunk
        .usage
        .map(|u| UsageMetadata::new(u.prompt_tokens, u.completion_tokens));

    for choice in chunk.choices.into_iter().filter(|c| c.index == 0) {
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            events.push(StreamEvent::ContentDelta {
                index: 0,
                delta: ContentDelta::TextDelta { text },
            });
        }
        if let Some(reason) = choice.finish_reason {
            events.push(StreamEvent::MessageEnd {
                finish_reason: FinishReason::from_provider(&reason),
                usage,
            });
        }
    }

    events
}
