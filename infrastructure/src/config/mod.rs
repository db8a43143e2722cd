//! Configuration file loading for compend
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COMPEND_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./compend.toml` or `./.compend.toml`
//! 4. Global: `$XDG_CONFIG_HOME/compend/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;

pub use error::ConfigError;
pub use file_config::{
    FileApiConfig, FileAuthConfig, FileConfig, FileOutputConfig, FileReplConfig,
    expand_home,
};
pub use loader::ConfigLoader;
