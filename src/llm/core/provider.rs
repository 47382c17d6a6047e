//! Provider trait for LLM implementations

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use super::{
    error::LlmError,
    types::{GenerateRequest, Model, ProviderKind, StreamEvent},
};
use crate::llm::claude::ClaudeClient;
use crate::llm::openai::OpenAiClient;

/// Stream of provider events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream generate content from the LLM
    ///
    /// Sends the request and returns a stream of events representing the
    /// incremental response. Errors before the first byte arrives are returned
    /// directly; errors after that surface as items of the stream.
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError>;
}

/// Where and how to reach a provider
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Secret key, if the endpoint needs one
    pub api_key: Option<String>,
    /// Longest silence tolerated between streamed chunks
    pub timeout: Duration,
}

/// Create an LLM provider for the given wire protocol
pub fn create_provider(
    kind: ProviderKind,
    endpoint: ProviderEndpoint,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match kind {
        ProviderKind::OpenAiCompatible => Ok(Arc::new(OpenAiClient::new(endpoint)?)),
        ProviderKind::Anthropic => Ok(Arc::new(ClaudeClient::new(endpoint)?)),
    }
}

/// The set of configured providers, keyed by wire protocol
#[derive(Clone)]
pub struct Providers {
    openai: Arc<dyn LlmProvider>,
    anthropic: Option<Arc<dyn LlmProvider>>,
}

impl Providers {
    pub fn new(openai: Arc<dyn LlmProvider>, anthropic: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { openai, anthropic }
    }

    /// Use one provider for every model
    pub fn single(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            openai: provider,
            anthropic: None,
        }
    }

    pub fn anthropic_enabled(&self) -> bool {
        self.anthropic.is_some()
    }

    /// Pick the provider serving `model`
    pub fn for_model(&self, model: &Model) -> Arc<dyn LlmProvider> {
        match (model.provider, &self.anthropic) {
            (ProviderKind::Anthropic, Some(anthropic)) => Arc::clone(anthropic),
            _ => Arc::clone(&self.openai),
        }
    }
}
