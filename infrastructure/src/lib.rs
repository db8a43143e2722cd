//! Infrastructure layer for compend
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the HTTP backend, the session file, and
//! configuration file loading.

pub mod config;
pub mod http;
pub mod session;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileApiConfig, FileAuthConfig, FileConfig, FileOutputConfig,
    FileReplConfig,
};
pub use http::HttpBackend;
pub use session::FileSessionStore;
