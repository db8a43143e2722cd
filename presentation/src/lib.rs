//! Presentation layer for compend
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporters, the session event presenter, and the interactive chat
//! interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;
pub mod session;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command, OutputArg, UploadArgs};
pub use cli::prompt::prompt_line;
pub use output::{
    ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for, set_color_enabled,
};
pub use progress::{ProgressReporter, ProgressSink, SimpleProgress};
pub use session::{EventPresenter, RowsDisplay};
