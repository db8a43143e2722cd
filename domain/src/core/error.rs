//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Everything here is detected locally, before any request reaches the
/// backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("File name cannot be empty")]
    EmptyFileName,

    #[error("Unsupported file type '{name}'. Supported formats: {supported}")]
    UnsupportedFileType { name: String, supported: String },

    #[error("Invalid document name: {0}")]
    InvalidDocumentName(String),
}

impl DomainError {
    /// Check if this error is a rejected upload file type
    pub fn is_unsupported_file_type(&self) -> bool {
        matches!(self, DomainError::UnsupportedFileType { .. })
    }
}
