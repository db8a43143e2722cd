//! Chat REPL configuration from TOML (`[repl]` section)

use super::auth::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show spinners while requests are in flight
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl FileReplConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.as_deref().map(expand_home)
    }
}
