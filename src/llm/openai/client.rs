//! Client for OpenAI-compatible chat completion endpoints

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider, ProviderEndpoint},
    types::{GenerateRequest, StreamEvent},
};
use crate::llm::http::{build_client, check_status, endpoint_url};

use super::mapper::{from_chunk, to_chat_request, ChunkState};
use super::sse::parse_sse_stream;

/// Client for any endpoint speaking the `/chat/completions` protocol
pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// Create a new client. The API key is optional so that local,
    /// unauthenticated gateways can be used.
    pub fn new(endpoint: ProviderEndpoint) -> Result<Self, LlmError> {
        Ok(Self {
            http_client: build_client(endpoint.timeout)?,
            base_url: endpoint.base_url,
            api_key: endpoint.api_key,
        })
    }

    async fn make_streaming_request(
        &self,
        request: GenerateRequest,
    ) -> Result<EventStream, LlmError> {
        let body = to_chat_request(request);

        let mut builder = self
            .http_client
            .post(endpoint_url(&self.base_url, "chat/completions"))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(builder.send().await?).await?;
        let chunk_stream = parse_sse_stream(Box::pin(response.bytes_stream()));

        let mut state = ChunkState::default();
        let event_stream = chunk_stream.flat_map(move |result| {
            let events: Vec<Result<StreamEvent, LlmError>> = match result {
                Ok(chunk) => from_chunk(chunk, &mut state).into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(events)
        });

        Ok(Box::pin(event_stream))
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_streaming_request(request).await
    }
}
