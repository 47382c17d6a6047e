//! Server-Sent Events (SSE) framing shared by the provider adapters
//!
//! Both upstream protocols deliver their streams as SSE:
//! ```text
//! event: content_block_delta
//! data: {"type":"content_block_delta",...}
//!
//! data: {"choices":[...]}
//!
//! ```
//!
//! This module only splits the byte stream into frames; each provider decodes
//! the `data` payload into its own event type.

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

/// Raw response body stream
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// One SSE event: optional `event:` name plus the joined `data:` lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Split a byte stream into SSE frames.
///
/// Bytes are buffered until a blank line closes an event, so frames and
/// multi-byte UTF-8 sequences may be split across network chunks. A final
/// event without a trailing blank line is flushed when the body ends.
/// Frames without any `data:` line (comments, bare `event:` lines) are dropped.
pub fn parse_sse_frames(
    byte_stream: ByteStream,
) -> Pin<Box<dyn Stream<Item = Result<SseFrame, LlmError>> + Send>> {
    let frames = async_stream::stream! {
        let mut byte_stream = byte_stream;
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = byte_stream.next().await {
            match chunk {
                Ok(bytes) => buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r')),
                Err(e) => {
                    yield Err(LlmError::StreamError(e.to_string()));
                    return;
                }
            }

            while let Some(end) = find_boundary(&buffer) {
                let raw: Vec<u8> = buffer.drain(..end + 2).collect();
                if let Some(frame) = parse_frame(&raw[..end]) {
                    yield frame;
                }
            }
        }

        if !buffer.is_empty() {
            if let Some(frame) = parse_frame(&buffer) {
                yield frame;
            }
        }
    };

    Box::pin(frames)
}

fn find_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Parse a single SSE event from its raw bytes
fn parse_frame(raw: &[u8]) -> Option<Result<SseFrame, LlmError>> {
    let text = match std::str::from_utf8(raw) {
        Ok(t) => t,
        Err(e) => {
            return Some(Err(LlmError::StreamError(format!(
                "Invalid UTF-8 in stream: {}",
                e
            ))))
        }
    };

    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(Ok(SseFrame {
        event,
        data: data_lines.join("\n"),
    }))
}
