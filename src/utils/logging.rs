//! Append-only log of data operations, kept apart from tracing output so a
//! user can read back what was imported, exported, or deleted.

use chrono::{SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    System,
    Error,
}

impl EventLevel {
    fn tag(self) -> &'static str {
        match self {
            EventLevel::System => "system",
            EventLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    file_path: Option<PathBuf>,
}

impl EventLog {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        EventLog {
            file_path: log_file,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Point the log at `path`, creating the file if needed.
    pub fn set_log_file(&mut self, path: PathBuf) -> std::io::Result<String> {
        test_file_access(&path)?;
        let message = format!("Event log enabled: {}", path.display());
        self.file_path = Some(path);
        Ok(message)
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn log_system(&self, message: &str) -> std::io::Result<()> {
        self.log(EventLevel::System, message)
    }

    pub fn log_error(&self, message: &str) -> std::io::Result<()> {
        self.log(EventLevel::Error, message)
    }

    pub fn log(&self, level: EventLevel, message: &str) -> std::io::Result<()> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut lines = message.lines();
        writeln!(
            writer,
            "## {timestamp} [{}] {}",
            level.tag(),
            lines.next().unwrap_or_default()
        )?;
        // Continuation lines (multi-line error chains) stay indented under the entry.
        for line in lines {
            writeln!(writer, "   {line}")?;
        }
        writer.flush()
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                path.file_name().unwrap_or_default().to_string_lossy()
            ),
        }
    }
}

fn test_file_access(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()
}
