//! Backend API configuration from TOML (`[api]` section)

use compend_domain::{ConfigIssue, ConfigIssueCode};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw API configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Backend base URL, e.g. `http://localhost:8000`. Required.
    pub base_url: Option<String>,
    /// Background refresh period in milliseconds
    pub poll_interval_ms: u64,
    /// Timeout for list/upload/delete requests in seconds
    pub request_timeout_secs: u64,
    /// Timeout for ask requests in seconds (`0` = wait indefinitely)
    pub ask_timeout_secs: u64,
    /// Delay between readiness probes in milliseconds
    pub readiness_retry_ms: u64,
    /// Readiness probes before giving up
    pub readiness_max_attempts: u32,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            poll_interval_ms: 2_000,
            request_timeout_secs: 30,
            ask_timeout_secs: 0,
            readiness_retry_ms: 1_000,
            readiness_max_attempts: 30,
        }
    }
}

impl FileApiConfig {
    /// Parse `base_url`, returning the issue that prevents its use.
    pub fn parse_base_url(&self) -> Result<Url, ConfigIssue> {
        let raw = match self.base_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return Err(ConfigIssue::error(
                    ConfigIssueCode::MissingBaseUrl,
                    "api.base_url is not set (use --api-url, COMPEND_API__BASE_URL or [api] base_url)",
                ));
            }
        };

        let invalid = |reason: String| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidBaseUrl {
                    value: raw.to_string(),
                },
                format!("api.base_url '{}' is not usable: {}", raw, reason),
            )
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        Ok(url)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` means no timeout.
    pub fn ask_timeout(&self) -> Option<Duration> {
        (self.ask_timeout_secs > 0).then(|| Duration::from_secs(self.ask_timeout_secs))
    }

    pub fn readiness_retry(&self) -> Duration {
        Duration::from_millis(self.readiness_retry_ms)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if let Err(issue) = self.parse_base_url() {
            issues.push(issue);
        }
        for (field, value) in [
            ("api.poll_interval_ms", self.poll_interval_ms),
            ("api.request_timeout_secs", self.request_timeout_secs),
            ("api.readiness_retry_ms", self.readiness_retry_ms),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroDuration {
                        field: field.to_string(),
                    },
                    format!("{} must be greater than 0", field),
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> FileApiConfig {
        FileApiConfig {
            base_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_base_url() {
        let err = FileApiConfig::default().parse_base_url().unwrap_err();
        assert_eq!(err.code, ConfigIssueCode::MissingBaseUrl);
        assert!(with_url("  ").parse_base_url().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = with_url("localhost:8000").parse_base_url().unwrap_err();
        assert!(matches!(err.code, ConfigIssueCode::InvalidBaseUrl { .. }));

        let err = with_url("ftp://files.example.com").parse_base_url().unwrap_err();
        assert!(err.message.contains("scheme"));
    }

    #[test]
    fn test_valid_base_url() {
        let url = with_url("http://localhost:8000").parse_base_url().unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8000));
    }

    #[test]
    fn test_durations() {
        let config = FileApiConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.ask_timeout(), None);
        assert_eq!(
            FileApiConfig {
                ask_timeout_secs: 120,
                ..Default::default()
            }
            .ask_timeout(),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_zero_interval_is_an_error() {
        let config = FileApiConfig {
            poll_interval_ms: 0,
            ..with_url("http://localhost:8000")
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }
}
