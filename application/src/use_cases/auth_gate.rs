//! Access gate use case.
//!
//! Decides whether the main interface may be shown and records a successful
//! login. The flag is client-local; see [`compend_domain::access`] for what
//! the gate does and does not protect.

use crate::ports::session_store::{SessionStore, SessionStoreError};
use compend_domain::{AccessGate, SessionRecord};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from logging in or out.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid access key")]
    InvalidKey,

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Result of checking the stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Already authenticated; show the main interface.
    Proceed(SessionRecord),
    /// Show the login screen.
    Login,
}

/// Use case guarding the main interface.
pub struct AuthGateUseCase {
    store: Arc<dyn SessionStore>,
    gate: AccessGate,
}

impl AuthGateUseCase {
    pub fn new(store: Arc<dyn SessionStore>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    /// Inspect the stored record. A store that cannot be read sends the user
    /// to the login screen instead of failing.
    pub fn check(&self) -> GateDecision {
        match self.store.load() {
            Ok(Some(record)) if record.authenticated => GateDecision::Proceed(record),
            Ok(_) => GateDecision::Login,
            Err(e) => {
                warn!("Failed to read session record: {}", e);
                GateDecision::Login
            }
        }
    }

    /// Compare `entered` with the shared secret and persist the flag on a
    /// match. A wrong key leaves the stored record untouched.
    pub fn login(&self, entered: &str) -> Result<SessionRecord, AuthError> {
        if !self.gate.admits(entered) {
            warn!("Rejected access key");
            return Err(AuthError::InvalidKey);
        }
        let record = SessionRecord::authenticated_now();
        self.store.save(&record)?;
        info!("Access granted");
        Ok(record)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()?;
        info!("Session cleared");
        Ok(())
    }
}
