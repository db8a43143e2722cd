//! JSON bodies exchanged with the backend.

use compend_domain::Document;
use serde::{Deserialize, Serialize};

/// `GET /documents`. A missing `files` field means no documents.
#[derive(Debug, Deserialize)]
pub(super) struct ListResponse {
    #[serde(default)]
    pub files: Vec<Document>,
}

/// `POST /documents/upload` and `DELETE /documents/{filename}`.
#[derive(Debug, Deserialize)]
pub(super) struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AskRequest<'a> {
    pub question: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct AskResponse {
    pub answer: String,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Status a backend meant when it wraps an HTTP error into a 500.
///
/// A handler that raises inside a catch-all reports
/// `500 {"detail": "404: File x not found"}`. Returns the inner status and
/// detail text in that case.
pub(super) fn wrapped_error(status: u16, body: &str) -> Option<(u16, String)> {
    if status != 500 {
        return None;
    }
    let detail = serde_json::from_str::<ErrorResponse>(body).ok()?.detail;
    let (code, rest) = detail.split_once(':')?;
    let code: u16 = code.trim().parse().ok()?;
    if !(400..500).contains(&code) {
        return None;
    }
    Some((code, rest.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use compend_domain::DocumentStatus;

    #[test]
    fn test_list_response_statuses() {
        let body = r#"{"files":[
            {"name":"a.pdf","status":"completed"},
            {"name":"b.pdf","status":"error: parse failure"},
            {"name":"c.pdf","status":"queued"}
        ]}"#;
        let response: ListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.files[0].status, DocumentStatus::Completed);
        assert_eq!(
            response.files[1].status,
            DocumentStatus::Error("parse failure".to_string())
        );
        assert_eq!(
            response.files[2].status,
            DocumentStatus::Unknown("queued".to_string())
        );
    }

    #[test]
    fn test_list_response_without_files() {
        let response: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(response.files.is_empty());
    }

    #[test]
    fn test_wrapped_not_found_is_unwrapped() {
        assert_eq!(
            wrapped_error(500, r#"{"detail":"404: File report.pdf not found"}"#),
            Some((404, "File report.pdf not found".to_string()))
        );
    }

    #[test]
    fn test_plain_server_errors_stay_as_is() {
        assert_eq!(wrapped_error(500, "vector store offline"), None);
        assert_eq!(wrapped_error(500, r#"{"detail":"Error deleting file: disk"}"#), None);
        assert_eq!(wrapped_error(500, r#"{"detail":"503: busy"}"#), None);
        assert_eq!(wrapped_error(404, r#"{"detail":"404: gone"}"#), None);
    }

    #[test]
    fn test_ask_request_body() {
        let body = serde_json::to_value(AskRequest { question: "Why?" }).unwrap();
        assert_eq!(body, serde_json::json!({ "question": "Why?" }));
    }
}
