//! Document entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of a document.
///
/// On the wire this is a plain string. The backend reports
/// `processing`, `completed`, or `error: <detail>`; `uploading` only ever
/// exists on the client, between picking a file and the backend accepting it.
///
/// Strings the client does not recognise are kept as [`Unknown`](Self::Unknown)
/// so a single odd row never fails a whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Completed,
    /// Ingestion failed. Holds the backend's detail text (may be empty).
    Error(String),
    Unknown(String),
}

impl DocumentStatus {
    /// Parse the wire representation.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "uploading" => Self::Uploading,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            _ => match trimmed.strip_prefix("error") {
                Some("") => Self::Error(String::new()),
                Some(rest) if rest.starts_with(':') => Self::Error(rest[1..].trim().to_string()),
                _ => Self::Unknown(raw.to_string()),
            },
        }
    }

    pub fn as_wire(&self) -> String {
        match self {
            Self::Uploading => "uploading".to_string(),
            Self::Processing => "processing".to_string(),
            Self::Completed => "completed".to_string(),
            Self::Error(detail) if detail.is_empty() => "error".to_string(),
            Self::Error(detail) => format!("error: {}", detail),
            Self::Unknown(raw) => raw.clone(),
        }
    }

    /// No further transitions are expected without user action.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Detail text of a failed ingestion.
    pub fn error_detail(&self) -> Option<&str> {
        match self {
            Self::Error(detail) => Some(detail),
            _ => None,
        }
    }
}

impl From<String> for DocumentStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_wire()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// A backend-tracked uploaded file (Entity)
///
/// Identity is `name`; the backend guarantees at most one document per name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub status: DocumentStatus,
}

impl Document {
    pub fn new(name: impl Into<String>, status: DocumentStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }

    pub fn processing(name: impl Into<String>) -> Self {
        Self::new(name, DocumentStatus::Processing)
    }

    pub fn completed(name: impl Into<String>) -> Self {
        Self::new(name, DocumentStatus::Completed)
    }
}
