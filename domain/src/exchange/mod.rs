//! Question/answer exchange.
//!
//! An exchange is ephemeral: nothing here is persisted, and each question is
//! answered independently of the previous ones.
//!
//! ```text
//! Idle ──submit──▶ Pending ──▶ Answered ─┐
//!                          └─▶ Errored  ─┴──submit──▶ Pending ...
//! ```

use crate::core::question::Question;
use serde::{Deserialize, Serialize};

/// Placeholder shown while the backend is working on an answer.
pub const PENDING_PLACEHOLDER: &str = "Thinking...";

/// An answer returned by the query facade (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// State of the single question slot of a client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AskState {
    #[default]
    Idle,
    Pending { question: Question },
    Answered { question: Question, answer: Answer },
    Errored { question: Question, message: String },
}

impl AskState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AskState::Pending { .. })
    }

    /// Move to `Pending`. Returns `false` (and changes nothing) if a
    /// question is already in flight.
    pub fn begin(&mut self, question: Question) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = AskState::Pending { question };
        true
    }

    /// Settle the pending exchange with an answer.
    pub fn answer(&mut self, answer: Answer) {
        if let AskState::Pending { question } = self {
            let question = question.clone();
            *self = AskState::Answered { question, answer };
        }
    }

    /// Settle the pending exchange with an error message.
    pub fn fail(&mut self, message: impl Into<String>) {
        if let AskState::Pending { question } = self {
            let question = question.clone();
            *self = AskState::Errored {
                question,
                message: message.into(),
            };
        }
    }

    /// Text for the answer panel: the placeholder while pending, the answer
    /// once settled, nothing otherwise (errors render separately).
    pub fn display_text(&self) -> Option<&str> {
        match self {
            AskState::Pending { .. } => Some(PENDING_PLACEHOLDER),
            AskState::Answered { answer, .. } => Some(&answer.text),
            _ => None,
        }
    }
}
