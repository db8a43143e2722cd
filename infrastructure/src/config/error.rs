//! Configuration errors

use compend_domain::ConfigIssue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {}", join_messages(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_messages(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
