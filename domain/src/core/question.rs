//! Question value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question to be answered by the backend (Value Object)
///
/// Construction rejects empty and whitespace-only text, so holding a
/// `Question` means it is safe to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Question {
    content: String,
}

impl Question {
    /// Try to create a new question
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::EmptyQuestion)
        } else {
            Ok(Self { content })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Short single-line preview for logs.
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self.content.trim().replace('\n', " ");
        if line.chars().count() <= max_chars {
            return line;
        }
        let cut: String = line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Question {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Question::try_new(s)
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::try_new(s)
    }
}

impl From<Question> for String {
    fn from(q: Question) -> Self {
        q.content
    }
}
