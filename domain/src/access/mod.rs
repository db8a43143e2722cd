//! Access gate.
//!
//! The gate keeps casual visitors out of the UI. It is **not** a security
//! boundary: the shared secret ships with the client and the backend does
//! not check anything. Anyone who can read the client configuration can
//! open the gate, and the backend API is reachable without it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key used when the configuration does not provide one.
pub const DEFAULT_ACCESS_KEY: &str = "compend-access";

/// Compares entered keys with the configured shared secret.
#[derive(Debug, Clone)]
pub struct AccessGate {
    shared_secret: String,
}

impl AccessGate {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
        }
    }

    /// Whether `entered` opens the gate. Exact match, no trimming.
    pub fn admits(&self, entered: &str) -> bool {
        !self.shared_secret.is_empty() && entered == self.shared_secret
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_KEY)
    }
}

/// Client-local session state as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub authenticated: bool,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn authenticated_now() -> Self {
        Self {
            authenticated: true,
            logged_in_at: Some(Utc::now()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            logged_in_at: None,
        }
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::anonymous()
    }
}
