//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod api;
mod auth;
mod output;
mod repl;

pub use api::FileApiConfig;
pub use auth::{FileAuthConfig, expand_home};
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;

use super::error::ConfigError;
use compend_application::ClientSettings;
use compend_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend location and timing
    pub api: FileApiConfig,
    /// Access gate
    pub auth: FileAuthConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Chat REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// A missing or malformed base URL is reported as an error; callers
    /// that talk to the backend must refuse to start on any error.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.api.validate();
        issues.extend(self.auth.validate());
        issues
    }

    /// Fail on any error-level issue; otherwise return the warnings.
    pub fn ensure_usable(&self) -> Result<Vec<ConfigIssue>, ConfigError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Timing parameters for the session client.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::default()
            .with_poll_interval(self.api.poll_interval())
            .with_readiness_retry(self.api.readiness_retry())
            .with_readiness_max_attempts(self.api.readiness_max_attempts)
    }
}
