//! JSON output for scripting

use super::formatter::OutputFormatter;
use compend_domain::DocumentRow;
use serde_json::json;

/// Formats output as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_rows(&self, rows: &[DocumentRow]) -> String {
        serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_answer(&self, question: &str, answer: &str) -> String {
        serde_json::to_string_pretty(&json!({ "question": question, "answer": answer }))
            .unwrap_or_else(|_| "{}".to_string())
    }
}
