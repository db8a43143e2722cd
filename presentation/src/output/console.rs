//! Console output formatter for document sessions

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use compend_domain::{DocumentRow, DocumentStatus};

/// Formats document rows and answers for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the document list as an aligned table
    pub fn format_rows(rows: &[DocumentRow]) -> String {
        let mut output = Self::section_header("Documents");

        if rows.is_empty() {
            output.push_str(&format!("{}\n", "No documents uploaded yet.".dimmed()));
            return output;
        }

        let width = rows
            .iter()
            .map(|row| row.name.chars().count())
            .max()
            .unwrap_or(0);

        for row in rows {
            let mut line = format!(
                "  {:<width$}  {}",
                row.name,
                Self::status_label(&row.status),
                width = width
            );
            if row.delete_pending {
                line.push_str(&format!("  {}", "(deleting...)".dimmed()));
            }
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    /// Format one answered question
    pub fn format_answer(question: &str, answer: &str) -> String {
        format!(
            "{} {}\n\n{}\n",
            "Q:".cyan().bold(),
            question,
            Self::indent(answer, "  ")
        )
    }

    pub fn status_label(status: &DocumentStatus) -> ColoredString {
        let text = status.as_wire();
        match status {
            DocumentStatus::Uploading => text.cyan(),
            DocumentStatus::Processing => text.yellow(),
            DocumentStatus::Completed => text.green(),
            DocumentStatus::Error(_) => text.red(),
            DocumentStatus::Unknown(_) => text.dimmed(),
        }
    }

    pub fn success(message: &str) -> String {
        format!("{} {}", "✓".green().bold(), message)
    }

    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    pub fn warning(message: &str) -> String {
        format!("{} {}", "Warning:".yellow().bold(), message)
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_rows(&self, rows: &[DocumentRow]) -> String {
        Self::format_rows(rows)
    }

    fn format_answer(&self, question: &str, answer: &str) -> String {
        Self::format_answer(question, answer)
    }
}
