//! Backend facade ports
//!
//! Defines the two external services the session client depends on: the
//! document store (list/upload/delete) and the query service (ask).
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use compend_domain::{Answer, Document, DocumentFormat, DomainError, Question};
use thiserror::Error;

/// Errors that can occur while talking to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: u16, body: String },

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(#[from] DomainError),

    /// The client is not configured to reach a backend.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 2xx response whose body does not match the contract.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        ClientError::Http {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The document (or route) does not exist on the backend.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The backend refused because of a conflicting document (e.g. a
    /// duplicate name, if that is the backend's policy).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Detected on the client; nothing was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

/// A file ready to be sent to the document store.
///
/// Built through [`UploadRequest::new`], which runs the client-side format
/// check, so holding one means the extension is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    file_name: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let file_name = file_name.into();
        let format = DocumentFormat::from_file_name(&file_name)?;
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Document store facade
///
/// The backend is the source of truth for which documents exist and what
/// state their ingestion is in.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All known documents with their current status.
    async fn list(&self) -> Result<Vec<Document>, ClientError>;

    /// Hand a file to the backend. Returns the backend's acknowledgement
    /// message once the file is accepted; ingestion continues afterwards.
    async fn upload(&self, request: UploadRequest) -> Result<String, ClientError>;

    /// Remove a document and everything derived from it.
    async fn delete(&self, name: &str) -> Result<String, ClientError>;
}

/// Query facade
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Answer a question from the processed documents. The backend answers
    /// even when no document is processed yet.
    async fn ask(&self, question: &Question) -> Result<Answer, ClientError>;
}
