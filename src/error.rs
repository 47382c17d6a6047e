//! HTTP error type and rejection rendering.
//!
//! Every failure leaves the service as `{"detail": "<message>"}` with a
//! matching status code.

use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::{header, StatusCode};
use warp::{Rejection, Reply};

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::uploads::UploadError;

pub const CREDENTIALS_INVALID: &str = "Could not validate credentials";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// License missing, expired or exhausted
    #[error("{0}")]
    PaymentRequired(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Logged in full; clients only see a generic message
    #[error("{0}")]
    Internal(String),
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn credentials() -> Self {
        ApiError::Unauthorized(CREDENTIALS_INVALID.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ValidationError(msg) => ApiError::BadRequest(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) => ApiError::credentials(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile => ApiError::BadRequest(err.to_string()),
            UploadError::TooLarge(_) => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::InvalidFilename => ApiError::BadRequest(err.to_string()),
            UploadError::Multipart(_) => ApiError::BadRequest(err.to_string()),
            UploadError::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

fn error_reply(status: StatusCode, detail: impl Into<String>) -> warp::reply::Response {
    let body = warp::reply::json(&ErrorBody {
        detail: detail.into(),
    });
    let mut response = warp::reply::with_status(body, status).into_response();
    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            header::HeaderValue::from_static("Bearer"),
        );
    }
    response
}

/// Render any rejection as a JSON error body
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        let status = api_error.status();
        if status.is_server_error() {
            error!(error = %api_error, "request failed");
        }
        return Ok(error_reply(status, api_error.detail()));
    }

    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not Found"));
    }

    if let Some(missing) = err.find::<warp::reject::MissingHeader>() {
        if missing.name().eq_ignore_ascii_case("authorization") {
            return Ok(error_reply(StatusCode::UNAUTHORIZED, "Not authenticated"));
        }
        return Ok(error_reply(StatusCode::BAD_REQUEST, missing.to_string()));
    }

    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, e.to_string()));
    }

    if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, e.to_string()));
    }

    if let Some(e) = err.find::<warp::reject::InvalidHeader>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, e.to_string()));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload too large",
        ));
    }

    if err.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(error_reply(
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header is required",
        ));
    }

    if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        return Ok(error_reply(StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string()));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        ));
    }

    warn!(rejection = ?err, "unhandled rejection");
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ))
}
