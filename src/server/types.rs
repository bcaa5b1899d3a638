use crate::config::RelayConfig;
use crate::core::downstream::DownstreamClient;
use anyhow::Error;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::IgnoredAny;
use serde_json::Value;

pub struct AppState {
    pub downstream: DownstreamClient,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Result<Self, Error> {
        Ok(Self {
            downstream: DownstreamClient::new(config)?,
        })
    }
}

/// The `document` part of an inbound upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A validated inbound upload, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub document: UploadedFile,
    pub question: Option<String>,
}

/// A successful downstream answer, relayed back unchanged.
#[derive(Debug, Clone)]
pub struct DownstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl IntoResponse for DownstreamReply {
    fn into_response(self) -> Response {
        if serde_json::from_slice::<IgnoredAny>(&self.body).is_ok() {
            return (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                self.body,
            )
                .into_response();
        }

        // not JSON: send it back as a JSON string so callers always get JSON
        let text = String::from_utf8_lossy(&self.body).into_owned();
        (self.status, Json(Value::String(text))).into_response()
    }
}
