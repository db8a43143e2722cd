//! Application layer for compend
//!
//! This crate contains the session client, the access gate use case, port
//! definitions, and client timing settings. It depends only on the domain
//! layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ClientSettings;
pub use ports::{
    backend::{ClientError, DocumentStore, QueryService, UploadRequest},
    session_event::SessionEvent,
    session_store::{SessionStore, SessionStoreError},
};
pub use use_cases::auth_gate::{AuthError, AuthGateUseCase, GateDecision};
pub use use_cases::poller::PollerHandle;
pub use use_cases::refresh::{RefreshApply, RefreshSeq, RefreshTracker};
pub use use_cases::session_client::{SessionClient, SessionError};
