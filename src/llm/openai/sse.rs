//! Decoding of OpenAI-style SSE frames
//!
//! Chunks arrive as unnamed `data:` events and the stream is terminated by
//! the literal sentinel `data: [DONE]`.

use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;
use crate::llm::sse::{parse_sse_frames, ByteStream};

use super::types::ChatCompletionChunk;

const DONE_SENTINEL: &str = "[DONE]";

/// Parse a byte stream into completion chunks, stopping at `[DONE]`
pub fn parse_sse_stream(
    byte_stream: ByteStream,
) -> Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, LlmError>> + Send>> {
    let mut frames = parse_sse_frames(byte_stream);

    let chunks = async_stream::stream! {
        while let Some(frame) = frames.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let data = frame.data.trim();
            if data == DONE_SENTINEL {
                return;
            }
            if data.is_empty() {
                continue;
            }

            yield serde_json::from_str::<ChatCompletionChunk>(data).map_err(|e| {
                LlmError::SerializationError(format!(
                    "Failed to parse completion chunk: {}. Data: {}",
                    e, data
                ))
            });
        }
    };

    Box::pin(chunks)
}
