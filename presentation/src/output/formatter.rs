//! Output formatter trait

use compend_domain::{DocumentRow, OutputFormat};

use super::console::ConsoleFormatter;
use super::json::JsonFormatter;

/// Renders document rows and answers for one output format
pub trait OutputFormatter {
    /// Format the document list
    fn format_rows(&self, rows: &[DocumentRow]) -> String;

    /// Format one question/answer exchange
    fn format_answer(&self, question: &str, answer: &str) -> String;
}

/// Formatter for the configured output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
