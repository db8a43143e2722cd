//! Output formatting for document lists and answers

pub mod console;
pub mod formatter;
pub mod json;

pub use console::ConsoleFormatter;
pub use formatter::{OutputFormatter, formatter_for};
pub use json::JsonFormatter;

/// Turn colored output off (config `output.color = false`).
pub fn set_color_enabled(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}
