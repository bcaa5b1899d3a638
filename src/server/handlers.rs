use crate::server::error::{ClientInputError, RelayError};
use crate::server::types::{AppState, DownstreamReply, UploadRequest, UploadedFile};
use crate::utils::constants::{
    DEFAULT_CONTENT_TYPE, DOCUMENT_FIELD, GREETING, MAX_FILE_SIZE, QUESTION_FIELD,
};
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use bytes::BytesMut;
use std::sync::Arc;
use tracing::Instrument;

// liveness marker
pub async fn server_status_handler() -> &'static str {
    GREETING
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("analyze", %request_id);

    match relay(&state, multipart).instrument(span.clone()).await {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            span.in_scope(|| match &err {
                RelayError::ClientInput(reason) => tracing::warn!(%reason, "rejected upload"),
                RelayError::DownstreamApplication { status, detail } => tracing::warn!(
                    status = status.as_u16(),
                    detail = ?detail,
                    "analysis service reported an error"
                ),
                RelayError::DownstreamUnreachable(reason) => {
                    tracing::error!(%reason, "no response from analysis service")
                }
                RelayError::Internal(reason) => tracing::error!(%reason, "relay failed"),
            });
            err.into_response()
        }
    }
}

async fn relay(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<DownstreamReply, RelayError> {
    let upload = read_upload(multipart).await?;

    tracing::info!(
        file_name = %upload.document.file_name,
        content_type = %upload.document.content_type,
        size = upload.document.bytes.len(),
        has_question = upload.question.is_some(),
        question = upload.question.as_deref().unwrap_or("-"),
        "document received"
    );

    state.downstream.analyze(upload).await
}

/// Collects the `document` file and optional `question` from the inbound form.
/// A body that is not multipart at all is treated as carrying no file.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadRequest, RelayError> {
    let Ok(mut multipart) = multipart else {
        return Err(ClientInputError::MissingFile.into());
    };

    let mut document = None;
    let mut question = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(RelayError::from_multipart)?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            // a `document` part without a filename is a plain text field, not a file
            Some(DOCUMENT_FIELD) if document.is_none() && field.file_name().is_some() => {
                document = Some(read_document(field).await?);
            }
            Some(QUESTION_FIELD) if question.is_none() => {
                let text = field.text().await.map_err(RelayError::from_multipart)?;
                if !text.is_empty() {
                    question = Some(text);
                }
            }
            _ => {}
        }
    }

    let document = document.ok_or(ClientInputError::MissingFile)?;
    Ok(UploadRequest { document, question })
}

// streams the part so an oversized file is refused before it is fully buffered
async fn read_document(mut field: Field<'_>) -> Result<UploadedFile, RelayError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let mut bytes = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(RelayError::from_multipart)? {
        if bytes.len() + chunk.len() > MAX_FILE_SIZE {
            return Err(ClientInputError::FileTooLarge {
                limit: MAX_FILE_SIZE,
            }
            .into());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.freeze(),
    })
}
