//! Progress indicators for in-flight requests

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Where the presenter sends progress and output lines.
///
/// Each in-flight request is tracked under a key (`upload:report.pdf`,
/// `ask`, ...) so several can be shown at once.
pub trait ProgressSink: Send + Sync {
    /// A request started or changed its message.
    fn start(&self, key: &str, message: &str);

    /// The request under `key` succeeded.
    fn finish_ok(&self, key: &str, message: &str);

    /// The request under `key` failed.
    fn finish_err(&self, key: &str, message: &str);

    /// Print a line without corrupting active indicators.
    fn println(&self, text: &str);
}

/// Spinners via indicatif, one per in-flight request
pub struct ProgressReporter {
    multi: MultiProgress,
    spinners: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            spinners: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn take(&self, key: &str) -> Option<ProgressBar> {
        self.spinners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn start(&self, key: &str, message: &str) {
        let mut spinners = self.spinners.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = spinners.get(key) {
            pb.set_message(message.to_string());
            return;
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        spinners.insert(key.to_string(), pb);
    }

    fn finish_ok(&self, key: &str, message: &str) {
        let line = format!("{} {}", "✓".green(), message);
        match self.take(key) {
            Some(pb) if !self.multi.is_hidden() => pb.finish_with_message(line),
            Some(pb) => {
                pb.finish_and_clear();
                eprintln!("{}", line);
            }
            None => self.status_line(&line),
        }
    }

    fn finish_err(&self, key: &str, message: &str) {
        let line = format!("{} {}", "✗".red(), message);
        match self.take(key) {
            Some(pb) if !self.multi.is_hidden() => pb.abandon_with_message(line),
            Some(pb) => {
                pb.finish_and_clear();
                eprintln!("{}", line);
            }
            None => self.status_line(&line),
        }
    }

    // Hidden draw targets (no terminal) swallow `MultiProgress::println`.
    fn println(&self, text: &str) {
        if self.multi.is_hidden() || self.multi.println(text).is_err() {
            println!("{}", text);
        }
    }
}

impl ProgressReporter {
    /// Request outcomes go to stderr so stdout stays parseable.
    fn status_line(&self, text: &str) {
        if self.multi.is_hidden() || self.multi.println(text).is_err() {
            eprintln!("{}", text);
        }
    }
}

/// Plain line output, no animation (for `--quiet` and non-interactive use)
pub struct SimpleProgress;

impl ProgressSink for SimpleProgress {
    fn start(&self, _key: &str, _message: &str) {}

    fn finish_ok(&self, _key: &str, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    fn finish_err(&self, _key: &str, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    fn println(&self, text: &str) {
        println!("{}", text);
    }
}
