//! `[output]` section: how `list` tables and `ask` answers are printed

use compend_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Printing preferences.
///
/// `format` applies to `list` and `ask`. Unset means text; a `--output`
/// flag on the command line wins over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<OutputFormat>,
    /// Status badges and markers in color
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// Format for one command, given its `--output` flag.
    pub fn format_for(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.format).unwrap_or_default()
    }
}
