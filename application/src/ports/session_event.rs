//! Session events emitted by the session client for presentation rendering
//!
//! These events form the output port from the application layer to the
//! presentation layer. The client never renders anything itself; a CLI
//! presenter, a REPL, or a test collects them from the channel.

use compend_domain::{Answer, DocumentRow, Question};

/// Events emitted by [`SessionClient`](crate::use_cases::session_client::SessionClient)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    // === Document list ===
    /// The displayed document rows changed (new listing or a local marker).
    DocumentsUpdated(Vec<DocumentRow>),
    /// A refresh failed. Previously displayed rows stay on screen.
    ListFailed { message: String },

    // === Upload ===
    UploadStarted { name: String },
    UploadSucceeded { name: String, message: String },
    UploadFailed { name: String, message: String },

    // === Delete ===
    DeleteStarted { name: String },
    DeleteSucceeded { name: String, message: String },
    DeleteFailed { name: String, message: String },

    // === Ask ===
    /// A question was sent; `placeholder` is shown until it settles.
    AskPending {
        question: Question,
        placeholder: &'static str,
    },
    AskAnswered { question: Question, answer: Answer },
    AskFailed { question: Question, message: String },

    // === Backend readiness ===
    BackendWaiting { attempt: u32, message: String },
    BackendReady,
}

impl SessionEvent {
    /// Whether this event reports a failure the user should see.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SessionEvent::ListFailed { .. }
                | SessionEvent::UploadFailed { .. }
                | SessionEvent::DeleteFailed { .. }
                | SessionEvent::AskFailed { .. }
        )
    }
}
