//! Human-readable progress lines (the bot's output sink).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;

/// Receives one line per patched issue or failure.
pub trait Reporter: Send + Sync {
    fn line(&self, line: &str);

    fn issue_patched(&self, number: u64, title: &str, labels: &[String]) {
        self.line(&format!(
            "Patched issue {number} - {title} with labels: {labels:?}"
        ));
    }

    fn update_failed(&self, status: u16, body: &str) {
        self.line(&format!("Editing labels failed: {status} / {body}"));
    }

    fn fetch_failed(&self, repo: &str, status: u16, body: &str) {
        self.line(&format!(
            "Fetching issues for {repo} failed: {status} / {body}"
        ));
    }

    fn unchanged(&self) {
        self.line("GitHub output unchanged, no action needed");
    }
}

/// Writes lines to stdout or to a file opened for appending.
pub struct SinkReporter {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl SinkReporter {
    pub fn stdout() -> Self {
        Self::from_writer(std::io::stdout())
    }

    pub fn append_to(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }

    /// Stdout when no path is configured.
    pub fn for_output(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::append_to(path),
            None => Ok(Self::stdout()),
        }
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(writer)),
        }
    }
}

impl Reporter for SinkReporter {
    fn line(&self, line: &str) {
        if let Ok(mut sink) = self.sink.lock() {
            // Write errors are ignored; output never aborts a batch.
            let _ = writeln!(sink, "{line}").and_then(|()| sink.flush());
        }
    }
}

/// Keeps lines in memory; handy when embedding the labeler or testing it.
#[derive(Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl Reporter for MemoryReporter {
    fn line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
