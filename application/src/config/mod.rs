//! Application-level configuration.
//!
//! - [`ClientSettings`]: polling and readiness timing for the session client

pub mod client_settings;

pub use client_settings::ClientSettings;
