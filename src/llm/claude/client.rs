//! Claude client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider, ProviderEndpoint},
    types::{GenerateRequest, UsageMetadata},
};
use crate::llm::http::{build_client, check_status, endpoint_url};

use super::mapper::{from_claude_event, to_claude_request};
use super::sse::parse_sse_stream;

/// Messages API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API
pub struct ClaudeClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl ClaudeClient {
    /// Create a new Claude client
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client cannot
    /// be built.
    pub fn new(endpoint: ProviderEndpoint) -> Result<Self, LlmError> {
        let api_key = endpoint.api_key.ok_or_else(|| {
            LlmError::AuthenticationError("ANTHROPIC_API_KEY is not set".to_string())
        })?;

        Ok(Self {
            http_client: build_client(endpoint.timeout)?,
            base_url: endpoint.base_url,
            api_key,
        })
    }

    /// Make a streaming request to Claude
    async fn make_streaming_request(
        &self,
        request: GenerateRequest,
    ) -> Result<EventStream, LlmError> {
        let claude_request = to_claude_request(request);

        let response = self
            .http_client
            .post(endpoint_url(&self.base_url, "messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&claude_request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let sse_stream = parse_sse_stream(Box::pin(response.bytes_stream()));

        let mut accumulated_usage = UsageMetadata::default();
        let event_stream = sse_stream.filter_map(move |result| {
            let mapped = match result {
                Ok(claude_event) => from_claude_event(claude_event, &mut accumulated_usage).map(Ok),
                Err(e) => Some(Err(e)),
            };
            futures::future::ready(mapped)
        });

        Ok(Box::pin(event_stream))
    }
}

#[async_trait]
impl LlmProvider for ClaudeClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_streaming_request(request).await
    }
}
