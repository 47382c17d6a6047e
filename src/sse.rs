use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;
use warp::http::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use warp::reply::Response;
use warp::Reply;

use crate::llm::TokenStream;

const STREAM_CONTENT_TYPE: &str = "text/event-stream; charset=utf-8";
const TOKEN_BUFFER: usize = 32;

/// Relay `tokens` from a spawned task into a channel-backed body stream.
///
/// Each token becomes one body chunk, unframed. The task stops as soon as the
/// receiving side is dropped.
pub fn token_chunks(mut tokens: TokenStream) -> ReceiverStream<Result<Bytes, Infallible>> {
    let (tx, rx) = mpsc::channel(TOKEN_BUFFER);

    tokio::spawn(async move {
        while let Some(token) = tokens.next().await {
            if tx.send(Ok(Bytes::from(token))).await.is_err() {
                debug!("client went away, dropping generation stream");
                return;
            }
        }
    });

    ReceiverStream::new(rx)
}

/// Streaming response carrying the raw token text
pub fn token_response(tokens: TokenStream) -> Response {
    let mut response = warp::reply::stream(token_chunks(tokens)).into_response();

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(STREAM_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));

    response
}
