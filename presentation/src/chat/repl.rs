//! REPL (Read-Eval-Print Loop) for an interactive document session

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use compend_application::{AuthGateUseCase, SessionClient, SessionError};
use compend_domain::DocumentFormat;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const HISTORY_SIZE: usize = 1000;

/// One parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Ask(String),
    List,
    Upload(PathBuf),
    Delete(String),
    Help,
    Logout,
    Quit,
    MissingArgument { command: &'static str, usage: &'static str },
    Unknown(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        if !line.starts_with('/') {
            return ReplInput::Ask(line.to_string());
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/list" | "/ls" => ReplInput::List,
            "/upload" if rest.is_empty() => ReplInput::MissingArgument {
                command: "/upload",
                usage: "/upload <path>",
            },
            "/upload" => ReplInput::Upload(PathBuf::from(rest)),
            "/delete" | "/rm" if rest.is_empty() => ReplInput::MissingArgument {
                command: "/delete",
                usage: "/delete <name>",
            },
            "/delete" | "/rm" => ReplInput::Delete(rest.to_string()),
            "/help" | "/h" | "/?" => ReplInput::Help,
            "/logout" => ReplInput::Logout,
            "/quit" | "/exit" | "/q" => ReplInput::Quit,
            other => ReplInput::Unknown(other.to_string()),
        }
    }
}

/// Interactive chat REPL
///
/// Free text is sent as a question; slash commands manage documents.
/// Uploads and deletes run in the background so the prompt stays
/// available; their results arrive through the event presenter.
pub struct ChatRepl {
    client: SessionClient,
    auth: Arc<AuthGateUseCase>,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(client: SessionClient, auth: Arc<AuthGateUseCase>) -> Self {
        Self {
            client,
            auth,
            history_path: None,
        }
    }

    /// Persist input history to this file
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Run the interactive REPL until `/quit`, `/logout` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("compend".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            let signal = tokio::task::block_in_place(|| editor.read_line(&prompt))?;
            let line = match signal {
                Signal::Success(line) => line,
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                _ => {
                    println!("^C");
                    continue;
                }
            };

            if self.dispatch(ReplInput::parse(&line)).await {
                break;
            }
        }

        Ok(())
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Could not open history file {}: {}", path.display(), e);
                editor
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│         Compend - Document Session          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Type a question to ask it, or a command:");
        Self::print_commands();
    }

    fn print_commands() {
        println!("  /list, /ls          - Show documents");
        println!("  /upload <path>      - Upload a file (runs in background)");
        println!("  /delete <name>      - Delete a document (runs in background)");
        println!("  /help, /h, /?       - Show this help");
        println!("  /logout             - Close the access gate and exit");
        println!("  /quit, /exit, /q    - Exit chat");
        println!();
    }

    /// Handle one input. Returns true if the REPL should exit.
    async fn dispatch(&self, input: ReplInput) -> bool {
        match input {
            ReplInput::Empty => false,
            ReplInput::Ask(question) => {
                // Rendering happens in the presenter; errors here are
                // single-flight refusals or validation.
                if let Err(e) = self.client.ask(&question).await
                    && matches!(e, SessionError::AskInProgress)
                {
                    println!("{}", ConsoleFormatter::warning(&e.to_string()));
                }
                false
            }
            ReplInput::List => {
                match self.client.refresh().await {
                    Ok(rows) => println!("{}", ConsoleFormatter::format_rows(&rows)),
                    Err(e) => {
                        println!("{}", ConsoleFormatter::format_rows(&self.client.rows()));
                        println!("{}", ConsoleFormatter::error(&e.to_string()));
                    }
                }
                false
            }
            ReplInput::Upload(path) => {
                self.spawn_upload(path);
                false
            }
            ReplInput::Delete(name) => {
                self.spawn_delete(name);
                false
            }
            ReplInput::Help => {
                println!();
                println!("Commands:");
                Self::print_commands();
                false
            }
            ReplInput::Logout => {
                match self.auth.logout() {
                    Ok(()) => println!("Logged out."),
                    Err(e) => println!("{}", ConsoleFormatter::error(&e.to_string())),
                }
                true
            }
            ReplInput::Quit => {
                println!("Bye!");
                true
            }
            ReplInput::MissingArgument { command, usage } => {
                println!("{} needs an argument: {}", command, usage.bold());
                false
            }
            ReplInput::Unknown(command) => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
                false
            }
        }
    }

    fn spawn_upload(&self, path: PathBuf) {
        if let Some(current) = self.client.uploading() {
            println!(
                "{}",
                ConsoleFormatter::warning(&format!("Still uploading {}", current))
            );
            return;
        }
        let client = self.client.clone();
        tokio::spawn(async move {
            let (name, bytes) = match read_upload(&path).await {
                Ok(file) => file,
                Err(message) => {
                    println!("{}", ConsoleFormatter::error(&message));
                    return;
                }
            };
            if let Err(e) = client.upload(&name, bytes).await {
                debug!("Upload of {} ended with: {}", name, e);
                if e.is_busy() {
                    println!("{}", ConsoleFormatter::warning(&e.to_string()));
                }
            }
        });
    }

    fn spawn_delete(&self, name: String) {
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.delete(&name).await {
                debug!("Delete of {} ended with: {}", name, e);
                if e.is_busy() {
                    println!("{}", ConsoleFormatter::warning(&e.to_string()));
                }
            }
        });
    }
}

/// Name and contents of a file to upload.
///
/// The type is checked from the name before the file is opened, so an
/// unsupported file is never read.
pub async fn read_upload(path: &Path) -> Result<(String, Vec<u8>), String> {
    let name = file_name(path);
    DocumentFormat::from_file_name(&name).map_err(|e| e.to_string())?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    Ok((name, bytes))
}

/// Name a file is uploaded under: the last path component.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
