use crate::utils::constants::{
    DOWNSTREAM_FAILURE_MESSAGE, DOWNSTREAM_UNREACHABLE_MESSAGE, FILE_TOO_LARGE_MESSAGE,
    INTERNAL_ERROR_MESSAGE, MALFORMED_MULTIPART_MESSAGE, MISSING_FILE_MESSAGE,
    REQUEST_TOO_LARGE_MESSAGE, SERVER_REQUEST_BODY_LIMIT,
};
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Problems with the inbound upload itself. Never reaches the downstream service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientInputError {
    #[error("no document file in the upload")]
    MissingFile,

    #[error("document exceeds {limit} bytes")]
    FileTooLarge { limit: usize },

    /// The whole form went over the body limit, whatever part caused it.
    #[error("request body exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },

    #[error("malformed multipart body: {0}")]
    MalformedMultipart(String),
}

/// Every way a relay attempt can fail. One of these, or a downstream reply,
/// is produced per request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    ClientInput(#[from] ClientInputError),

    /// Downstream answered with a non-success status.
    #[error("downstream returned {status}")]
    DownstreamApplication {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The request went out but no response came back.
    #[error("downstream unreachable: {0}")]
    DownstreamUnreachable(String),

    #[error("internal relay error: {0}")]
    Internal(String),
}

/// Fixed JSON shape of every relay-constructed error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    fn new(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            error,
        }
    }
}

impl RelayError {
    /// Status and body for this failure. Pure, so the mapping is testable without I/O.
    pub fn into_parts(self) -> (StatusCode, ErrorBody) {
        match self {
            RelayError::ClientInput(ClientInputError::MissingFile) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(MISSING_FILE_MESSAGE, None))
            }
            RelayError::ClientInput(ClientInputError::FileTooLarge { .. }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody::new(FILE_TOO_LARGE_MESSAGE, None),
            ),
            RelayError::ClientInput(ClientInputError::RequestTooLarge { .. }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody::new(REQUEST_TOO_LARGE_MESSAGE, None),
            ),
            RelayError::ClientInput(ClientInputError::MalformedMultipart(reason)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(MALFORMED_MULTIPART_MESSAGE, Some(reason)),
            ),
            RelayError::DownstreamApplication { status, detail } => {
                let message = detail
                    .clone()
                    .unwrap_or_else(|| DOWNSTREAM_FAILURE_MESSAGE.to_string());
                let error = detail.unwrap_or_else(|| {
                    format!("Request failed with status code {}", status.as_u16())
                });
                (status, ErrorBody::new(message, Some(error)))
            }
            RelayError::DownstreamUnreachable(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(DOWNSTREAM_UNREACHABLE_MESSAGE, Some(reason)),
            ),
            RelayError::Internal(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(INTERNAL_ERROR_MESSAGE, Some(reason)),
            ),
        }
    }

    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ClientInputError::RequestTooLarge {
                limit: SERVER_REQUEST_BODY_LIMIT,
            }
            .into();
        }
        ClientInputError::MalformedMultipart(err.body_text()).into()
    }

    /// Classifies a failed outbound send. Only request construction problems
    /// are internal; everything after the request left is "unreachable".
    pub fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            RelayError::Internal(err.to_string())
        } else {
            RelayError::DownstreamUnreachable(err.to_string())
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}

/// Pulls a human-readable `detail` out of a downstream error body.
/// Empty, null, false and zero count as absent.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
