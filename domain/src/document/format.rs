//! Supported upload formats

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// File formats the backend accepts for ingestion.
///
/// The set is fixed by the backend contract; anything else is rejected
/// before a request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Pptx,
    Ppt,
    Xlsx,
    Xls,
    Csv,
    Epub,
    Html,
    Md,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 12] = [
        Self::Pdf,
        Self::Docx,
        Self::Doc,
        Self::Pptx,
        Self::Ppt,
        Self::Xlsx,
        Self::Xls,
        Self::Csv,
        Self::Epub,
        Self::Html,
        Self::Md,
        Self::Txt,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Pptx => "pptx",
            Self::Ppt => "ppt",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
            Self::Epub => "epub",
            Self::Html => "html",
            Self::Md => "md",
            Self::Txt => "txt",
        }
    }

    /// MIME type sent with the multipart upload part.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Doc => "application/msword",
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Ppt => "application/vnd.ms-powerpoint",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Xls => "application/vnd.ms-excel",
            Self::Csv => "text/csv",
            Self::Epub => "application/epub+zip",
            Self::Html => "text/html",
            Self::Md => "text/markdown",
            Self::Txt => "text/plain",
        }
    }

    /// Comma-separated list of every supported extension, for messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validate an upload file name and return its format.
    ///
    /// Only the final extension counts and matching is case-insensitive, so
    /// `Report.PDF` is accepted and `archive.pdf.zip` is not.
    pub fn from_file_name(name: &str) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyFileName);
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .ok_or_else(|| DomainError::UnsupportedFileType {
                name: name.to_string(),
                supported: Self::supported_list(),
            })
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or_else(|| format!("unsupported extension: {}", s))
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
