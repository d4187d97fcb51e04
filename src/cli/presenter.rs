//! CLI presenter for output formatting

use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::{FileError, FileOutcome};
use crate::domain::media::MediaKind;

/// Presenter for CLI output formatting.
///
/// Shared between use case callbacks, so the spinner sits behind a lock.
pub struct Presenter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    /// Start a spinner with message, replacing any running one
    pub fn start_spinner(&self, message: &str) {
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Some(old) = self.swap_spinner(Some(spinner)) {
            old.finish_and_clear();
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&self, message: &str) {
        if let Some(spinner) = self.swap_spinner(None) {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&self, message: &str) {
        if let Some(spinner) = self.swap_spinner(None) {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&self) {
        if let Some(spinner) = self.swap_spinner(None) {
            spinner.finish_and_clear();
        }
    }

    fn swap_spinner(&self, next: Option<ProgressBar>) -> Option<ProgressBar> {
        match self.spinner.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a plain progress line to stderr
    pub fn status(&self, message: &str) {
        eprintln!("{message}");
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Announce work on a file
    pub fn file_started(&self, kind: MediaKind, path: &str) {
        let line = file_start_line(kind, path);
        if kind == MediaKind::Video {
            self.start_spinner(&line);
        } else {
            self.status(&line);
        }
    }

    /// Report how a file ended
    pub fn file_done(&self, kind: MediaKind, path: &str, result: &Result<FileOutcome, FileError>) {
        match result {
            Ok(outcome) => {
                let line = file_outcome_line(outcome);
                if kind == MediaKind::Video {
                    self.spinner_success(&format!("{path}: {line}"));
                } else if !line.is_empty() {
                    self.status(&format!("    {line}"));
                }
            }
            Err(e) if e.is_cancelled() => self.stop_spinner(),
            Err(e) => {
                self.stop_spinner();
                self.error(&format!("{path}: {e}"));
            }
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress line printed when a file starts
pub fn file_start_line(kind: MediaKind, path: &str) -> String {
    match kind {
        MediaKind::Other => format!("🗄️  Copying {path}"),
        _ => format!("🗜️  Tinying {path}"),
    }
}

/// Detail line for a finished file, empty when there is nothing to add
pub fn file_outcome_line(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::AlreadyExists => "✔️  file already exists".to_string(),
        FileOutcome::Copied => String::new(),
        FileOutcome::Transcoded {
            diff,
            replaced: false,
        } => diff.clone(),
        FileOutcome::Transcoded {
            diff,
            replaced: true,
        } => format!("{diff}, kept the original"),
    }
}

/// Warning line for a kind of media that is configured to be skipped
pub fn kind_skipped_line(kind: MediaKind) -> String {
    format!("⚠️ Skipping {kind} files")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_line_differs_for_copies() {
        assert_eq!(
            file_start_line(MediaKind::Other, "input/notes.txt"),
            "🗄️  Copying input/notes.txt"
        );
        assert_eq!(
            file_start_line(MediaKind::Image, "input/a.png"),
            "🗜️  Tinying input/a.png"
        );
    }

    #[test]
    fn outcome_lines() {
        assert_eq!(
            file_outcome_line(&FileOutcome::AlreadyExists),
            "✔️  file already exists"
        );
        assert!(file_outcome_line(&FileOutcome::Copied).is_empty());

        let diff = "10KB ➡️  8KB (-18.2%)".to_string();
        assert_eq!(
            file_outcome_line(&FileOutcome::Transcoded {
                diff: diff.clone(),
                replaced: false
            }),
            diff
        );
        assert!(file_outcome_line(&FileOutcome::Transcoded {
            diff,
            replaced: true
        })
        .ends_with("kept the original"));
    }

    #[test]
    fn skipped_line_names_the_kind() {
        assert_eq!(kind_skipped_line(MediaKind::Audio), "⚠️ Skipping audio files");
    }

    #[test]
    fn spinner_can_be_restarted_and_stopped() {
        let presenter = Presenter::new();
        presenter.start_spinner("one");
        presenter.start_spinner("two");
        presenter.spinner_success("done");
        presenter.stop_spinner();
        assert!(presenter.swap_spinner(None).is_none());
    }
}
