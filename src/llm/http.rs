//! HTTP plumbing shared by the provider clients

use reqwest::{Client, Response};
use std::time::Duration;

use crate::llm::core::error::LlmError;

/// Build the HTTP client used for provider calls.
///
/// `idle_timeout` is the longest gap allowed between two reads, so a slow
/// but steady stream may run for longer than it.
pub fn build_client(idle_timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .read_timeout(idle_timeout)
        .build()
        .map_err(|e| LlmError::HttpError {
            status: 0,
            body: format!("Failed to create HTTP client: {}", e),
        })
}

/// Turn a non-success response into an `LlmError`, keeping the body text
pub async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    Err(LlmError::from_status(status.as_u16(), retry_after, body))
}

/// Join a base URL and a path without doubling the slash
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
