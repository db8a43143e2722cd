//! Renders [`SessionEvent`]s from the session client.
//!
//! The presenter owns the receiving end of the event channel and turns
//! events into spinners and printed lines. It ends when every sender (the
//! client and its clones) is gone.

use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressSink;
use colored::Colorize;
use compend_application::SessionEvent;
use compend_domain::{DocumentRow, DocumentStatus};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// How document list updates are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsDisplay {
    /// Reprint the whole table whenever it changes (`watch`).
    Table,
    /// Print one line per added, removed, or changed document (`chat`).
    Changes,
    /// Ignore list updates (one-shot commands print their own result).
    Hidden,
}

/// Turns session events into terminal output.
pub struct EventPresenter {
    sink: Box<dyn ProgressSink>,
    rows_display: RowsDisplay,
    show_answers: bool,
    last_rows: Option<Vec<DocumentRow>>,
    last_list_error: Option<String>,
}

impl EventPresenter {
    pub fn new(sink: Box<dyn ProgressSink>, rows_display: RowsDisplay) -> Self {
        Self {
            sink,
            rows_display,
            show_answers: true,
            last_rows: None,
            last_list_error: None,
        }
    }

    /// Whether answers are printed (off when the caller prints them itself,
    /// e.g. as JSON).
    pub fn with_answers(mut self, show: bool) -> Self {
        self.show_answers = show;
        self
    }

    /// Render events until the channel closes.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::DocumentsUpdated(rows) => self.on_rows(rows),
            SessionEvent::ListFailed { message } => {
                // Polling repeats the same failure every tick; say it once.
                if self.last_list_error.as_deref() != Some(message.as_str()) {
                    self.sink.println(&ConsoleFormatter::warning(&message));
                    self.last_list_error = Some(message);
                }
            }

            SessionEvent::UploadStarted { name } => {
                self.sink
                    .start(&upload_key(&name), &format!("Uploading {}...", name));
            }
            SessionEvent::UploadSucceeded { name, message } => {
                self.sink.finish_ok(&upload_key(&name), &message);
            }
            SessionEvent::UploadFailed { name, message } => {
                self.sink.finish_err(&upload_key(&name), &message);
            }

            SessionEvent::DeleteStarted { name } => {
                self.sink
                    .start(&delete_key(&name), &format!("Deleting {}...", name));
            }
            SessionEvent::DeleteSucceeded { name, message } => {
                self.sink.finish_ok(&delete_key(&name), &message);
            }
            SessionEvent::DeleteFailed { name, message } => {
                self.sink.finish_err(&delete_key(&name), &message);
            }

            SessionEvent::AskPending { placeholder, .. } => {
                self.sink.start(ASK_KEY, placeholder);
            }
            SessionEvent::AskAnswered { question, answer } => {
                self.sink.finish_ok(ASK_KEY, "Answer received");
                if self.show_answers {
                    self.sink.println(&ConsoleFormatter::format_answer(
                        question.content(),
                        &answer.text,
                    ));
                }
            }
            SessionEvent::AskFailed { message, .. } => {
                self.sink.finish_err(ASK_KEY, &message);
            }

            SessionEvent::BackendWaiting { attempt, message } => {
                self.sink.start(
                    BACKEND_KEY,
                    &format!("Waiting for backend (attempt {}): {}", attempt, message),
                );
            }
            SessionEvent::BackendReady => {
                self.sink.finish_ok(BACKEND_KEY, "Backend ready");
            }
        }
    }

    fn on_rows(&mut self, rows: Vec<DocumentRow>) {
        if self.last_list_error.take().is_some() {
            self.sink.println(&format!("{}", "Document list reachable again".green()));
        }
        if self.last_rows.as_ref() == Some(&rows) {
            return;
        }

        match self.rows_display {
            RowsDisplay::Table => self.sink.println(&ConsoleFormatter::format_rows(&rows)),
            RowsDisplay::Changes => {
                if let Some(previous) = &self.last_rows {
                    for line in status_changes(previous, &rows) {
                        self.sink.println(&line);
                    }
                }
            }
            RowsDisplay::Hidden => {}
        }
        self.last_rows = Some(rows);
    }
}

const ASK_KEY: &str = "ask";
const BACKEND_KEY: &str = "backend";

fn upload_key(name: &str) -> String {
    format!("upload:{}", name)
}

fn delete_key(name: &str) -> String {
    format!("delete:{}", name)
}

/// Lines describing how the backend's view changed between two row sets.
///
/// Client-local rows (`uploading`) and delete markers are not changes of
/// the backend state and are skipped.
pub fn status_changes(previous: &[DocumentRow], current: &[DocumentRow]) -> Vec<String> {
    let backend = |rows: &[DocumentRow]| -> Vec<(String, DocumentStatus)> {
        rows.iter()
            .filter(|row| row.status != DocumentStatus::Uploading)
            .map(|row| (row.name.clone(), row.status.clone()))
            .collect()
    };
    let before = backend(previous);
    let after = backend(current);
    let before_map: HashMap<&str, &DocumentStatus> =
        before.iter().map(|(n, s)| (n.as_str(), s)).collect();
    let after_map: HashMap<&str, &DocumentStatus> =
        after.iter().map(|(n, s)| (n.as_str(), s)).collect();

    let mut lines = Vec::new();
    for (name, status) in &after {
        match before_map.get(name.as_str()) {
            None => lines.push(format!(
                "{} {} ({})",
                "+".green(),
                name,
                ConsoleFormatter::status_label(status)
            )),
            Some(old) if *old != status => lines.push(format!(
                "{} {}: {} -> {}",
                "~".yellow(),
                name,
                ConsoleFormatter::status_label(old),
                ConsoleFormatter::status_label(status)
            )),
            Some(_) => {}
        }
    }
    for (name, _) in &before {
        if !after_map.contains_key(name.as_str()) {
            lines.push(format!("{} {}", "-".red(), name));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use compend_domain::{Answer, PENDING_PLACEHOLDER, Question};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ProgressSink for Recorder {
        fn start(&self, key: &str, message: &str) {
            self.0.lock().unwrap().push(format!("start {} {}", key, message));
        }
        fn finish_ok(&self, key: &str, message: &str) {
            self.0.lock().unwrap().push(format!("ok {} {}", key, message));
        }
        fn finish_err(&self, key: &str, message: &str) {
            self.0.lock().unwrap().push(format!("err {} {}", key, message));
        }
        fn println(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    fn row(name: &str, status: DocumentStatus) -> DocumentRow {
        DocumentRow {
            name: name.to_string(),
            status,
            delete_pending: false,
        }
    }

    fn presenter(display: RowsDisplay) -> (EventPresenter, Recorder) {
        colored::control::set_override(false);
        let recorder = Recorder::default();
        (
            EventPresenter::new(Box::new(recorder.clone()), display),
            recorder,
        )
    }

    #[test]
    fn test_status_changes() {
        colored::control::set_override(false);
        let before = vec![
            row("a.pdf", DocumentStatus::Processing),
            row("gone.txt", DocumentStatus::Completed),
            row("new.md", DocumentStatus::Uploading),
        ];
        let after = vec![
            row("a.pdf", DocumentStatus::Completed),
            row("new.md", DocumentStatus::Processing),
        ];

        assert_eq!(
            status_changes(&before, &after),
            vec![
                "~ a.pdf: processing -> completed",
                "+ new.md (processing)",
                "- gone.txt",
            ]
        );
    }

    #[test]
    fn test_changes_mode_uses_first_update_as_baseline() {
        let (mut presenter, recorder) = presenter(RowsDisplay::Changes);

        presenter.handle(SessionEvent::DocumentsUpdated(vec![row(
            "a.pdf",
            DocumentStatus::Processing,
        )]));
        assert!(recorder.lines().is_empty());

        presenter.handle(SessionEvent::DocumentsUpdated(vec![row(
            "a.pdf",
            DocumentStatus::Completed,
        )]));
        assert_eq!(recorder.lines(), vec!["~ a.pdf: processing -> completed"]);
    }

    #[test]
    fn test_table_mode_skips_unchanged_rows() {
        let (mut presenter, recorder) = presenter(RowsDisplay::Table);
        let rows = vec![row("a.pdf", DocumentStatus::Completed)];

        presenter.handle(SessionEvent::DocumentsUpdated(rows.clone()));
        presenter.handle(SessionEvent::DocumentsUpdated(rows));

        assert_eq!(recorder.lines().len(), 1);
        assert!(recorder.lines()[0].contains("a.pdf"));
    }

    #[test]
    fn test_repeated_list_failure_reported_once() {
        let (mut presenter, recorder) = presenter(RowsDisplay::Hidden);
        for _ in 0..3 {
            presenter.handle(SessionEvent::ListFailed {
                message: "Failed to fetch documents: refused".to_string(),
            });
        }
        assert_eq!(recorder.lines().len(), 1);

        presenter.handle(SessionEvent::DocumentsUpdated(vec![]));
        assert_eq!(recorder.lines().len(), 2);
    }

    #[test]
    fn test_ask_lifecycle() {
        let (mut presenter, recorder) = presenter(RowsDisplay::Hidden);
        let question = Question::try_new("Why?").unwrap();

        presenter.handle(SessionEvent::AskPending {
            question: question.clone(),
            placeholder: PENDING_PLACEHOLDER,
        });
        presenter.handle(SessionEvent::AskAnswered {
            question,
            answer: Answer::new("Because."),
        });

        let lines = recorder.lines();
        assert_eq!(lines[0], "start ask Thinking...");
        assert_eq!(lines[1], "ok ask Answer received");
        assert!(lines[2].contains("Because."));
    }

    #[test]
    fn test_answers_can_be_left_to_caller() {
        let (presenter, recorder) = presenter(RowsDisplay::Hidden);
        let mut presenter = presenter.with_answers(false);

        presenter.handle(SessionEvent::AskAnswered {
            question: Question::try_new("Why?").unwrap(),
            answer: Answer::new("Because."),
        });

        assert_eq!(recorder.lines(), vec!["ok ask Answer received"]);
    }

    #[test]
    fn test_upload_keys_are_per_file() {
        let (mut presenter, recorder) = presenter(RowsDisplay::Hidden);
        presenter.handle(SessionEvent::UploadStarted {
            name: "a.pdf".to_string(),
        });
        presenter.handle(SessionEvent::UploadFailed {
            name: "a.pdf".to_string(),
            message: "Upload failed: 500, details: boom".to_string(),
        });

        assert_eq!(
            recorder.lines(),
            vec![
                "start upload:a.pdf Uploading a.pdf...",
                "err upload:a.pdf Upload failed: 500, details: boom",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_ends_when_senders_drop() {
        let (presenter, recorder) = presenter(RowsDisplay::Hidden);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(SessionEvent::BackendReady).unwrap();
        drop(tx);

        presenter.run(rx).await;

        assert_eq!(recorder.lines(), vec!["ok backend Backend ready"]);
    }
}
