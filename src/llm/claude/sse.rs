//! Decoding of Claude SSE frames into typed events

use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;
use crate::llm::sse::{parse_sse_frames, ByteStream, SseFrame};

use super::types::ClaudeStreamEvent;

/// Parse a stream of bytes as Claude SSE events
///
/// Claude names every event (`event: message_start`, `event: ping`, ...) and
/// repeats the name as the `type` field of the JSON payload, so the payload
/// alone is enough to decode.
pub fn parse_sse_stream(
    byte_stream: ByteStream,
) -> Pin<Box<dyn Stream<Item = Result<ClaudeStreamEvent, LlmError>> + Send>> {
    let events = parse_sse_frames(byte_stream).filter_map(|frame| async move {
        match frame {
            Ok(frame) => decode_frame(frame),
            Err(e) => Some(Err(e)),
        }
    });

    Box::pin(events)
}

fn decode_frame(frame: SseFrame) -> Option<Result<ClaudeStreamEvent, LlmError>> {
    if frame.data.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<ClaudeStreamEvent>(&frame.data) {
        Ok(event) => Some(Ok(event)),
        Err(e) => Some(Err(LlmError::SerializationError(format!(
            "Failed to parse Claude SSE event (type: {:?}): {}. Data: {}",
            frame.event, e, frame.data
        )))),
    }
}
