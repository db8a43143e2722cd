//! Access gate configuration from TOML (`[auth]` section)

use compend_domain::{AccessGate, ConfigIssue, ConfigIssueCode, DEFAULT_ACCESS_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw auth configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuthConfig {
    /// Shared secret for `compend login`. Not a security boundary.
    pub access_key: String,
    /// Where the session flag is stored (default: data dir)
    pub session_file: Option<String>,
}

impl Default for FileAuthConfig {
    fn default() -> Self {
        Self {
            access_key: DEFAULT_ACCESS_KEY.to_string(),
            session_file: None,
        }
    }
}

impl FileAuthConfig {
    pub fn gate(&self) -> AccessGate {
        AccessGate::new(self.access_key.clone())
    }

    /// Configured session file with `~` expanded.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file.as_deref().map(expand_home)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        if self.access_key.is_empty() {
            vec![ConfigIssue::warning(
                ConfigIssueCode::EmptyAccessKey,
                "auth.access_key is empty; `compend login` will always fail",
            )]
        } else {
            Vec::new()
        }
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_builtin_key() {
        let config = FileAuthConfig::default();
        assert!(config.gate().admits(DEFAULT_ACCESS_KEY));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_empty_key_warns() {
        let config = FileAuthConfig {
            access_key: String::new(),
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/tmp/session.json"), PathBuf::from("/tmp/session.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/s.json"), home.join("s.json"));
        }
    }
}
