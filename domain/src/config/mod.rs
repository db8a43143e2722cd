//! Configuration value types shared across layers.

pub mod output_format;
pub mod validation;

pub use output_format::OutputFormat;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors};
