//! Session client timing parameters.
//!
//! [`ClientSettings`] groups the static parameters that control how often
//! [`SessionClient`](crate::use_cases::session_client::SessionClient) talks
//! to the backend on its own. Request timeouts belong to the HTTP adapter,
//! not here.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Polling and readiness parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Period of the background `list()` refresh.
    pub poll_interval: Duration,
    /// Delay between readiness probes while the backend is starting.
    pub readiness_retry: Duration,
    /// Readiness probes before giving up. `0` means a single probe.
    pub readiness_max_attempts: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            readiness_retry: Duration::from_secs(1),
            readiness_max_attempts: 30,
        }
    }
}

impl ClientSettings {
    // ==================== Builder Methods ====================

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_readiness_retry(mut self, delay: Duration) -> Self {
        self.readiness_retry = delay;
        self
    }

    pub fn with_readiness_max_attempts(mut self, attempts: u32) -> Self {
        self.readiness_max_attempts = attempts;
        self
    }
}
