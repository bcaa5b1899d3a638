use crate::config::RelayConfig;
use crate::server::error::{RelayError, extract_detail};
use crate::server::types::{DownstreamReply, UploadRequest};
use crate::utils::constants::{
    ANALYZE_DOCUMENT_PATH, FORWARDED_FILE_FIELD, FORWARDED_QUESTION_FIELD,
};
use crate::utils::urls::endpoint_url;
use anyhow::{Context, Error};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;

/// HTTP client for the document-analysis service.
///
/// One instance is shared by all requests; the underlying `reqwest::Client`
/// pools connections. No retries are performed.
pub struct DownstreamClient {
    http_client: Client,
    analyze_url: Url,
    timeout: Option<Duration>,
}

impl DownstreamClient {
    pub fn new(config: &RelayConfig) -> Result<Self, Error> {
        let analyze_url = endpoint_url(&config.downstream_base_url, ANALYZE_DOCUMENT_PATH)
            .context("failed to build the analyze_document URL")?;

        Ok(Self {
            http_client: Client::new(),
            analyze_url,
            timeout: config.downstream_timeout,
        })
    }

    #[cfg(test)]
    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }

    /// Forwards one upload and waits for the downstream answer.
    ///
    /// A 2xx response becomes a [`DownstreamReply`]; any other status becomes
    /// [`RelayError::DownstreamApplication`].
    pub async fn analyze(&self, upload: UploadRequest) -> Result<DownstreamReply, RelayError> {
        let form = build_form(upload)?;

        let mut builder = self.http_client.post(self.analyze_url.clone()).multipart(form);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let request = builder
            .build()
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        tracing::debug!(
            url = %request.url(),
            content_type = ?request.headers().get(CONTENT_TYPE),
            content_length = ?request.headers().get(reqwest::header::CONTENT_LENGTH),
            "forwarding document to analysis service"
        );

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(RelayError::from_send)?;

        let status = response.status();
        let body = response.bytes().await.map_err(RelayError::from_send)?;

        tracing::info!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "analysis service replied"
        );

        if status.is_success() {
            Ok(DownstreamReply { status, body })
        } else {
            Err(RelayError::DownstreamApplication {
                status,
                detail: extract_detail(&body),
            })
        }
    }
}

/// Re-encodes an upload as the multipart form the analysis service expects.
/// Boundary and content type come from the encoder.
pub fn build_form(upload: UploadRequest) -> Result<Form, RelayError> {
    let document = upload.document;
    let length = document.bytes.len() as u64;

    let file_part = Part::stream_with_length(document.bytes, length)
        .file_name(document.file_name)
        .mime_str(&document.content_type)
        .map_err(|e| RelayError::Internal(format!("invalid content type: {}", e)))?;

    let mut form = Form::new().part(FORWARDED_FILE_FIELD, file_part);
    if let Some(question) = upload.question {
        form = form.text(FORWARDED_QUESTION_FIELD, question);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::types::UploadedFile;
    use axum::http::StatusCode;
    use bytes::Bytes;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base: &str, timeout: Option<Duration>) -> DownstreamClient {
        let config = RelayConfig {
            port: 0,
            downstream_base_url: Url::parse(base).unwrap(),
            downstream_timeout: timeout,
        };
        DownstreamClient::new(&config).unwrap()
    }

    fn upload(content_type: &str, question: Option<&str>) -> UploadRequest {
        UploadRequest {
            document: UploadedFile {
                file_name: "invoice.pdf".to_string(),
                content_type: content_type.to_string(),
                bytes: Bytes::from_static(b"%PDF-1.7 fake"),
            },
            question: question.map(String::from),
        }
    }

    #[test]
    fn test_analyze_url_keeps_base_prefix() {
        let client = client_for("http://ai.internal:8000/api/", None);
        assert_eq!(
            client.analyze_url().as_str(),
            "http://ai.internal:8000/api/analyze_document"
        );
    }

    #[test]
    fn test_invalid_content_type_is_internal_error() {
        let err = build_form(upload("not a mime type", None)).unwrap_err();
        assert!(matches!(err, RelayError::Internal(_)));
    }

    #[test]
    fn test_form_boundary_comes_from_encoder() {
        let form = build_form(upload("application/pdf", Some("total?"))).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_application_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze_document"))
            .respond_with(
                ResponseTemplate::new(415).set_body_json(serde_json::json!({"detail": "unsupported"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), None);
        let err = client.analyze(upload("application/pdf", None)).await.unwrap_err();

        match err {
            RelayError::DownstreamApplication { status, detail } => {
                assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
                assert_eq!(detail.as_deref(), Some("unsupported"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_configured_timeout_is_classified_as_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "success"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Some(Duration::from_millis(100)));
        let err = client.analyze(upload("application/pdf", None)).await.unwrap_err();
        assert!(matches!(err, RelayError::DownstreamUnreachable(_)));
    }
}
