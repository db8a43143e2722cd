//! reqwest implementation of [`DocumentStore`] and [`QueryService`].

use super::wire::{AskRequest, AskResponse, ListResponse, MessageResponse, wrapped_error};
use crate::config::FileApiConfig;
use async_trait::async_trait;
use compend_application::{ClientError, DocumentStore, QueryService, UploadRequest};
use compend_domain::{Answer, Document, Question};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Backend reached over HTTP.
///
/// | Operation | Request |
/// |---|---|
/// | list | `GET /documents` |
/// | upload | `POST /documents/upload` (multipart, field `file`) |
/// | delete | `DELETE /documents/{filename}` |
/// | ask | `POST /chat` with `{"question": ...}` |
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    request_timeout: Duration,
    ask_timeout: Option<Duration>,
}

impl HttpBackend {
    /// `ask_timeout: None` lets a question wait as long as the backend needs.
    pub fn new(
        base_url: Url,
        request_timeout: Duration,
        ask_timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            request_timeout,
            ask_timeout,
        })
    }

    pub fn from_config(config: &FileApiConfig) -> Result<Self, ClientError> {
        let base_url = config
            .parse_base_url()
            .map_err(|issue| ClientError::Configuration(issue.message))?;
        Self::new(base_url, config.request_timeout(), config.ask_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Configuration(format!("'{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn prepare(&self, request: RequestBuilder, timeout: Option<Duration>) -> RequestBuilder {
        let request = request.header(ACCEPT, HeaderValue::from_static("application/json"));
        match timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        request.send().await.map_err(network_error)
    }
}

fn network_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Network(format!("request timed out: {}", e))
    } else {
        ClientError::Network(e.to_string())
    }
}

/// Decode a 2xx JSON body, or turn anything else into a [`ClientError`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "Backend responded");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if let Some((inner, detail)) = wrapped_error(status.as_u16(), &body) {
            debug!(inner, "Backend wrapped a client error in a 500");
            return Err(ClientError::http(inner, detail));
        }
        return Err(ClientError::http(status.as_u16(), body));
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl DocumentStore for HttpBackend {
    async fn list(&self) -> Result<Vec<Document>, ClientError> {
        let url = self.endpoint(&["documents"])?;
        let request = self.prepare(self.client.get(url), Some(self.request_timeout));
        let body: ListResponse = read_json(self.send(request).await?).await?;
        Ok(body.files)
    }

    async fn upload(&self, request: UploadRequest) -> Result<String, ClientError> {
        let url = self.endpoint(&["documents", "upload"])?;
        let file_name = request.file_name().to_string();
        let mime = request.format().mime_type();

        let part = Part::bytes(request.into_bytes())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ClientError::Configuration(format!("invalid mime type {}: {}", mime, e)))?;
        let form = Form::new().part("file", part);

        let http = self.prepare(
            self.client.post(url).multipart(form),
            Some(self.request_timeout),
        );
        let body: MessageResponse = read_json(self.send(http).await?).await?;
        Ok(body.message)
    }

    async fn delete(&self, name: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["documents", name])?;
        let request = self.prepare(self.client.delete(url), Some(self.request_timeout));
        let body: MessageResponse = read_json(self.send(request).await?).await?;
        Ok(body.message)
    }
}

#[async_trait]
impl QueryService for HttpBackend {
    async fn ask(&self, question: &Question) -> Result<Answer, ClientError> {
        let url = self.endpoint(&["chat"])?;
        let request = self.prepare(
            self.client.post(url).json(&AskRequest {
                question: question.content(),
            }),
            self.ask_timeout,
        );
        let body: AskResponse = read_json(self.send(request).await?).await?;
        Ok(Answer::new(body.answer))
    }
}
