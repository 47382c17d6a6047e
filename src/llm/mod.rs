//! LLM Abstraction Layer
//!
//! This module provides a unified streaming interface over OpenAI-compatible
//! chat completion endpoints and the Anthropic Messages API, plus the relay
//! that feeds model output to HTTP clients.

pub mod claude;
pub mod core;
pub mod http;
pub mod openai;
pub mod relay;
pub mod sse;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{create_provider, EventStream, LlmProvider, ProviderEndpoint, Providers},
    types::{
        ContentDelta, FinishReason, GenerateRequest, Message, MessageRole, Model, ProviderKind,
        StreamEvent, UsageMetadata,
    },
};

pub use relay::{normalize, ChatRelay, TokenStream};
