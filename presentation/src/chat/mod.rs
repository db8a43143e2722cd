//! Interactive chat module
//!
//! Provides a reedline-based interactive session.

mod repl;

pub use repl::{ChatRepl, ReplInput, file_name, read_upload};
